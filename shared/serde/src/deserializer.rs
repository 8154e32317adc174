use crate::SerdeErr;

/// Source of state written by a binary [`crate::StateSerializer`].
///
/// Implementors provide raw reads; the typed helpers mirror the serializer's
/// vocabulary and validate bounds, returning [`SerdeErr`] instead of trusting
/// the stream.
pub trait StateDeserializer {
    fn read_exact(&mut self, name: &str, out: &mut [u8]) -> Result<(), SerdeErr>;

    /// Number of unread bytes.
    fn remaining(&self) -> usize;

    fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn number_u8_unbounded(&mut self, name: &str) -> Result<u8, SerdeErr> {
        let mut bytes = [0u8; 1];
        self.read_exact(name, &mut bytes)?;
        Ok(bytes[0])
    }

    fn number_u8(&mut self, name: &str, lower: u8, upper: u8) -> Result<u8, SerdeErr> {
        let value = self.number_u8_unbounded(name)?;
        check_bounds(name, value, lower, upper)
    }

    fn number_u16_unbounded(&mut self, name: &str) -> Result<u16, SerdeErr> {
        let mut bytes = [0u8; 2];
        self.read_exact(name, &mut bytes)?;
        Ok(u16::from_le_bytes(bytes))
    }

    fn number_u32_unbounded(&mut self, name: &str) -> Result<u32, SerdeErr> {
        let mut bytes = [0u8; 4];
        self.read_exact(name, &mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn number_u32(&mut self, name: &str, lower: u32, upper: u32) -> Result<u32, SerdeErr> {
        let value = self.number_u32_unbounded(name)?;
        check_bounds(name, value, lower, upper)
    }

    fn number_i32_unbounded(&mut self, name: &str) -> Result<i32, SerdeErr> {
        let mut bytes = [0u8; 4];
        self.read_exact(name, &mut bytes)?;
        Ok(i32::from_le_bytes(bytes))
    }

    fn number_i32(&mut self, name: &str, lower: i32, upper: i32) -> Result<i32, SerdeErr> {
        let value = self.number_i32_unbounded(name)?;
        check_bounds(name, value, lower, upper)
    }

    fn number_u64_unbounded(&mut self, name: &str) -> Result<u64, SerdeErr> {
        let mut bytes = [0u8; 8];
        self.read_exact(name, &mut bytes)?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn number_i64_unbounded(&mut self, name: &str) -> Result<i64, SerdeErr> {
        let mut bytes = [0u8; 8];
        self.read_exact(name, &mut bytes)?;
        Ok(i64::from_le_bytes(bytes))
    }

    fn number_f32_unbounded(&mut self, name: &str) -> Result<f32, SerdeErr> {
        let mut bytes = [0u8; 4];
        self.read_exact(name, &mut bytes)?;
        Ok(f32::from_le_bytes(bytes))
    }

    fn number_f64_unbounded(&mut self, name: &str) -> Result<f64, SerdeErr> {
        let mut bytes = [0u8; 8];
        self.read_exact(name, &mut bytes)?;
        Ok(f64::from_le_bytes(bytes))
    }

    /// Reads the raw representation of a 16.16 fixed-point value.
    fn number_fixed_unbounded(&mut self, name: &str) -> Result<i32, SerdeErr> {
        self.number_i32_unbounded(name)
    }

    fn bool(&mut self, name: &str) -> Result<bool, SerdeErr> {
        match self.number_u8_unbounded(name)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SerdeErr::InvalidBool {
                name: name.to_string(),
                value,
            }),
        }
    }

    fn string(&mut self, name: &str) -> Result<String, SerdeErr> {
        let bytes = self.raw_bytes(name)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8 {
            name: name.to_string(),
        })
    }

    fn string_ascii(
        &mut self,
        name: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, SerdeErr> {
        let value = self.string(name)?;
        if !value.is_ascii() {
            return Err(SerdeErr::NonAsciiString {
                name: name.to_string(),
            });
        }
        if value.len() < min_length || value.len() > max_length {
            return Err(SerdeErr::InvalidStringLength {
                name: name.to_string(),
                length: value.len(),
                min_length,
                max_length,
            });
        }
        Ok(value)
    }

    fn raw_bytes(&mut self, name: &str) -> Result<Vec<u8>, SerdeErr> {
        let length = self.number_u32_unbounded(name)? as usize;
        if length > self.remaining() {
            return Err(SerdeErr::UnexpectedEnd {
                name: name.to_string(),
                needed: length,
                remaining: self.remaining(),
            });
        }
        let mut bytes = vec![0u8; length];
        self.read_exact(name, &mut bytes)?;
        Ok(bytes)
    }
}

fn check_bounds<T: PartialOrd + ToString>(
    name: &str,
    value: T,
    lower: T,
    upper: T,
) -> Result<T, SerdeErr> {
    if value < lower || value > upper {
        return Err(SerdeErr::OutOfBounds {
            name: name.to_string(),
            value: value.to_string(),
            lower: lower.to_string(),
            upper: upper.to_string(),
        });
    }
    Ok(value)
}

/// Reads a stream produced by [`crate::StdSerializer`].
pub struct StdDeserializer<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> StdDeserializer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl StateDeserializer for StdDeserializer<'_> {
    fn read_exact(&mut self, name: &str, out: &mut [u8]) -> Result<(), SerdeErr> {
        let remaining = self.remaining();
        if out.len() > remaining {
            return Err(SerdeErr::UnexpectedEnd {
                name: name.to_string(),
                needed: out.len(),
                remaining,
            });
        }
        out.copy_from_slice(&self.buffer[self.cursor..self.cursor + out.len()]);
        self.cursor += out.len();
        Ok(())
    }

    fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }
}
