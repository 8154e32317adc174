//! # Simcore Serde
//! Canonical serialization of simulation state. The same component-facing
//! vocabulary drives three sinks: a binary stream (save games, rejoin), a
//! content hash (out-of-sync detection) and a human-readable dump.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod debug_serializer;
mod deserializer;
mod error;
mod hash;
mod number;
mod serializer;
mod std_serializer;

pub use debug_serializer::DebugSerializer;
pub use deserializer::{StateDeserializer, StdDeserializer};
pub use error::SerdeErr;
pub use hash::{HashSerializer, StateHash, STATE_HASH_BYTES};
pub use number::Number;
pub use serializer::StateSerializer;
pub use std_serializer::{BinarySerializer, ByteSink, StdSerializer};
