use crate::Number;

/// Sink for component and manager state.
///
/// Implementors only provide the primitive `put_*` methods; components use the
/// typed helpers, which carry a field name (used by the debug dump) and, for the
/// bounded variants, the range the reader will enforce.
pub trait StateSerializer {
    fn put_number(&mut self, name: &str, value: Number);
    fn put_bool(&mut self, name: &str, value: bool);
    fn put_string(&mut self, name: &str, value: &str);
    fn put_raw(&mut self, name: &str, data: &[u8]);

    /// Free-form text, only meaningful for human-readable output.
    fn text_line(&mut self, _line: &str) {}
    fn indent(&mut self, _spaces: usize) {}
    fn dedent(&mut self, _spaces: usize) {}

    /// True for serializers producing human-readable output.
    fn is_debug(&self) -> bool {
        false
    }

    fn number_u8(&mut self, name: &str, value: u8, lower: u8, upper: u8) {
        debug_assert!(lower <= value && value <= upper, "{} out of bounds", name);
        self.put_number(name, Number::U8(value));
    }

    fn number_u8_unbounded(&mut self, name: &str, value: u8) {
        self.put_number(name, Number::U8(value));
    }

    fn number_u16_unbounded(&mut self, name: &str, value: u16) {
        self.put_number(name, Number::U16(value));
    }

    fn number_u32(&mut self, name: &str, value: u32, lower: u32, upper: u32) {
        debug_assert!(lower <= value && value <= upper, "{} out of bounds", name);
        self.put_number(name, Number::U32(value));
    }

    fn number_u32_unbounded(&mut self, name: &str, value: u32) {
        self.put_number(name, Number::U32(value));
    }

    fn number_i32(&mut self, name: &str, value: i32, lower: i32, upper: i32) {
        debug_assert!(lower <= value && value <= upper, "{} out of bounds", name);
        self.put_number(name, Number::I32(value));
    }

    fn number_i32_unbounded(&mut self, name: &str, value: i32) {
        self.put_number(name, Number::I32(value));
    }

    fn number_u64_unbounded(&mut self, name: &str, value: u64) {
        self.put_number(name, Number::U64(value));
    }

    fn number_i64_unbounded(&mut self, name: &str, value: i64) {
        self.put_number(name, Number::I64(value));
    }

    fn number_f32_unbounded(&mut self, name: &str, value: f32) {
        self.put_number(name, Number::F32(value));
    }

    fn number_f64_unbounded(&mut self, name: &str, value: f64) {
        self.put_number(name, Number::F64(value));
    }

    /// Writes a 16.16 fixed-point value given its raw representation.
    fn number_fixed_unbounded(&mut self, name: &str, raw: i32) {
        self.put_number(name, Number::Fixed(raw));
    }

    fn bool(&mut self, name: &str, value: bool) {
        self.put_bool(name, value);
    }

    fn string_ascii(&mut self, name: &str, value: &str, min_length: usize, max_length: usize) {
        debug_assert!(value.is_ascii(), "{} is not ASCII", name);
        debug_assert!(
            min_length <= value.len() && value.len() <= max_length,
            "{} length out of bounds",
            name
        );
        self.put_string(name, value);
    }

    fn string(&mut self, name: &str, value: &str) {
        self.put_string(name, value);
    }

    fn raw_bytes(&mut self, name: &str, data: &[u8]) {
        self.put_raw(name, data);
    }
}
