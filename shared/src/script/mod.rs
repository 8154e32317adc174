mod error;
mod runtime;
mod value;

pub use error::ScriptError;
pub use runtime::{ScriptConstructor, ScriptObject, ScriptRuntime};
pub use value::{deserialize_script_value, serialize_script_value, ScriptValue};
