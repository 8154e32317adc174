use std::{collections::BTreeMap, fmt::Write};

use simcore_serde::{SerdeErr, StateDeserializer, StateSerializer};

/// A script-side value as seen by native code.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ScriptValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i32),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    Object(BTreeMap<String, ScriptValue>),
}

const TAG_UNDEFINED: u8 = 0;
const TAG_NULL: u8 = 1;
const TAG_ARRAY: u8 = 2;
const TAG_OBJECT: u8 = 3;
const TAG_STRING: u8 = 4;
const TAG_INT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BOOL: u8 = 7;

// Guards the decoder against hostile nesting.
const MAX_DEPTH: usize = 64;

impl ScriptValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, ScriptValue::Undefined)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ScriptValue::Int(value) => Some(*value),
            ScriptValue::Number(value) if value.fract() == 0.0 => Some(*value as i32),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Int(value) => Some(f64::from(*value)),
            ScriptValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        match self {
            ScriptValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Compact JSON-like rendering, used by debug dumps.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out);
        out
    }

    fn write_json(&self, out: &mut String) {
        match self {
            ScriptValue::Undefined => out.push_str("undefined"),
            ScriptValue::Null => out.push_str("null"),
            ScriptValue::Bool(value) => {
                let _ = write!(out, "{}", value);
            }
            ScriptValue::Int(value) => {
                let _ = write!(out, "{}", value);
            }
            ScriptValue::Number(value) => {
                let _ = write!(out, "{}", value);
            }
            ScriptValue::String(value) => {
                let _ = write!(out, "{:?}", value);
            }
            ScriptValue::Array(items) => {
                out.push('[');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    item.write_json(out);
                }
                out.push(']');
            }
            ScriptValue::Object(map) => {
                out.push('{');
                for (index, (key, item)) in map.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{:?}:", key);
                    item.write_json(out);
                }
                out.push('}');
            }
        }
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        ScriptValue::Int(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::String(value.to_string())
    }
}

/// Writes `value` as a tagged tree. Debug serializers get a single readable
/// line instead.
pub fn serialize_script_value(
    name: &str,
    value: &ScriptValue,
    serializer: &mut dyn StateSerializer,
) {
    if serializer.is_debug() {
        serializer.text_line(&format!("{}: {}", name, value.to_json()));
        return;
    }
    write_tagged(name, value, serializer);
}

fn write_tagged(name: &str, value: &ScriptValue, serializer: &mut dyn StateSerializer) {
    match value {
        ScriptValue::Undefined => serializer.number_u8_unbounded("type", TAG_UNDEFINED),
        ScriptValue::Null => serializer.number_u8_unbounded("type", TAG_NULL),
        ScriptValue::Bool(value) => {
            serializer.number_u8_unbounded("type", TAG_BOOL);
            serializer.bool(name, *value);
        }
        ScriptValue::Int(value) => {
            serializer.number_u8_unbounded("type", TAG_INT);
            serializer.number_i32_unbounded(name, *value);
        }
        ScriptValue::Number(value) => {
            serializer.number_u8_unbounded("type", TAG_DOUBLE);
            serializer.number_f64_unbounded(name, *value);
        }
        ScriptValue::String(value) => {
            serializer.number_u8_unbounded("type", TAG_STRING);
            serializer.string(name, value);
        }
        ScriptValue::Array(items) => {
            serializer.number_u8_unbounded("type", TAG_ARRAY);
            serializer.number_u32_unbounded("length", items.len() as u32);
            for item in items {
                write_tagged("item", item, serializer);
            }
        }
        ScriptValue::Object(map) => {
            serializer.number_u8_unbounded("type", TAG_OBJECT);
            serializer.number_u32_unbounded("properties", map.len() as u32);
            for (key, item) in map {
                serializer.string("prop name", key);
                write_tagged(key, item, serializer);
            }
        }
    }
}

pub fn deserialize_script_value(
    name: &str,
    deserializer: &mut dyn StateDeserializer,
) -> Result<ScriptValue, SerdeErr> {
    read_tagged(name, deserializer, 0)
}

fn read_tagged(
    name: &str,
    deserializer: &mut dyn StateDeserializer,
    depth: usize,
) -> Result<ScriptValue, SerdeErr> {
    let tag = deserializer.number_u8_unbounded("type")?;
    if depth > MAX_DEPTH && matches!(tag, TAG_ARRAY | TAG_OBJECT) {
        return Err(SerdeErr::InvalidTag {
            name: name.to_string(),
            tag,
        });
    }
    let value = match tag {
        TAG_UNDEFINED => ScriptValue::Undefined,
        TAG_NULL => ScriptValue::Null,
        TAG_BOOL => ScriptValue::Bool(deserializer.bool(name)?),
        TAG_INT => ScriptValue::Int(deserializer.number_i32_unbounded(name)?),
        TAG_DOUBLE => ScriptValue::Number(deserializer.number_f64_unbounded(name)?),
        TAG_STRING => ScriptValue::String(deserializer.string(name)?),
        TAG_ARRAY => {
            let length = deserializer.number_u32_unbounded("length")?;
            let mut items = Vec::new();
            for _ in 0..length {
                items.push(read_tagged("item", deserializer, depth + 1)?);
            }
            ScriptValue::Array(items)
        }
        TAG_OBJECT => {
            let count = deserializer.number_u32_unbounded("properties")?;
            let mut map = BTreeMap::new();
            for _ in 0..count {
                let key = deserializer.string("prop name")?;
                let item = read_tagged(&key, deserializer, depth + 1)?;
                map.insert(key, item);
            }
            ScriptValue::Object(map)
        }
        tag => {
            return Err(SerdeErr::InvalidTag {
                name: name.to_string(),
                tag,
            })
        }
    };
    Ok(value)
}
