use crate::{Number, StateSerializer};

/// Destination of a binary state stream.
pub trait ByteSink {
    fn put(&mut self, data: &[u8]);
}

impl ByteSink for Vec<u8> {
    fn put(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

impl ByteSink for blake3::Hasher {
    fn put(&mut self, data: &[u8]) {
        self.update(data);
    }
}

/// Binary encoding shared by the stream and hash serializers: little-endian
/// numbers, bools as a single 0/1 byte, strings and raw blocks prefixed by their
/// `u32` byte length. Field names are not written.
pub struct BinarySerializer<S: ByteSink> {
    sink: S,
    bytes_written: usize,
}

/// Serializer producing the canonical byte stream used for saves and rejoins.
pub type StdSerializer = BinarySerializer<Vec<u8>>;

impl<S: ByteSink> BinarySerializer<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            sink,
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn write(&mut self, data: &[u8]) {
        self.bytes_written += data.len();
        self.sink.put(data);
    }

    fn write_length(&mut self, length: usize) {
        let length = u32::try_from(length).unwrap_or(u32::MAX);
        self.write(&length.to_le_bytes());
    }
}

impl BinarySerializer<Vec<u8>> {
    pub fn new() -> Self {
        Self::with_sink(Vec::with_capacity(4096))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.sink
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.sink
    }
}

impl Default for BinarySerializer<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ByteSink> StateSerializer for BinarySerializer<S> {
    fn put_number(&mut self, _name: &str, value: Number) {
        let mut encoded = [0u8; 8];
        let mut length = 0;
        value.write_le(&mut |data| {
            encoded[..data.len()].copy_from_slice(data);
            length = data.len();
        });
        self.write(&encoded[..length]);
    }

    fn put_bool(&mut self, _name: &str, value: bool) {
        self.write(&[u8::from(value)]);
    }

    fn put_string(&mut self, _name: &str, value: &str) {
        self.write_length(value.len());
        self.write(value.as_bytes());
    }

    fn put_raw(&mut self, _name: &str, data: &[u8]) {
        self.write_length(data.len());
        self.write(data);
    }
}
