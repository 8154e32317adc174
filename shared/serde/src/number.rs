use std::fmt;

/// A single fixed-width numeric field, as written by a [`crate::StateSerializer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    /// 16.16 fixed-point, carried as its raw representation
    Fixed(i32),
}

impl Number {
    /// Appends the little-endian encoding of this number to `out`.
    pub fn write_le(&self, out: &mut dyn FnMut(&[u8])) {
        match *self {
            Number::U8(value) => out(&[value]),
            Number::U16(value) => out(&value.to_le_bytes()),
            Number::U32(value) => out(&value.to_le_bytes()),
            Number::I32(value) | Number::Fixed(value) => out(&value.to_le_bytes()),
            Number::U64(value) => out(&value.to_le_bytes()),
            Number::I64(value) => out(&value.to_le_bytes()),
            Number::F32(value) => out(&value.to_le_bytes()),
            Number::F64(value) => out(&value.to_le_bytes()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::U8(value) => write!(f, "{}", value),
            Number::U16(value) => write!(f, "{}", value),
            Number::U32(value) => write!(f, "{}", value),
            Number::I32(value) => write!(f, "{}", value),
            Number::U64(value) => write!(f, "{}", value),
            Number::I64(value) => write!(f, "{}", value),
            Number::F32(value) => write!(f, "{:?}", value),
            Number::F64(value) => write!(f, "{:?}", value),
            Number::Fixed(raw) => write!(f, "{}", fixed_to_string(raw)),
        }
    }
}

// Exact decimal rendering of a 16.16 value, trailing zeros trimmed
fn fixed_to_string(raw: i32) -> String {
    let negative = raw < 0;
    let magnitude = (raw as i64).unsigned_abs();
    let integer = magnitude >> 16;
    let mut fraction = magnitude & 0xFFFF;

    let mut output = String::new();
    if negative {
        output.push('-');
    }
    output.push_str(&integer.to_string());

    if fraction != 0 {
        output.push('.');
        // every 16-bit binary fraction terminates within 16 decimal digits
        while fraction != 0 {
            fraction *= 10;
            output.push(char::from(b'0' + (fraction >> 16) as u8));
            fraction &= 0xFFFF;
        }
    }
    output
}
