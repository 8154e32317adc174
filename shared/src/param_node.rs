use std::collections::BTreeMap;

use crate::{script::ScriptValue, types::Fixed};

/// A node of an entity template: a text value plus named children.
///
/// Children are kept sorted by name, which fixes the order components of a
/// template are constructed in. Children whose name starts with `@` are
/// attributes of the node, not components.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamNode {
    value: String,
    children: BTreeMap<String, ParamNode>,
}

impl ParamNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_child(mut self, name: impl Into<String>, child: ParamNode) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    pub fn insert_child(&mut self, name: impl Into<String>, child: ParamNode) {
        self.children.insert(name.into(), child);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn child(&self, name: &str) -> Option<&ParamNode> {
        self.children.get(name)
    }

    /// Children in ascending name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &ParamNode)> {
        self.children
            .iter()
            .map(|(name, child)| (name.as_str(), child))
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn to_i32(&self) -> Option<i32> {
        self.value.trim().parse().ok()
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self.value.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Parses a decimal string into 16.16 fixed point without going through
    /// floating point.
    pub fn to_fixed(&self) -> Option<Fixed> {
        let text = self.value.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut raw = whole << Fixed::FRACTIONAL_BITS;
        if !fraction.is_empty() {
            if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let digits = &fraction[..fraction.len().min(9)];
            let numerator: i64 = digits.parse().ok()?;
            let denominator = 10i64.pow(digits.len() as u32);
            raw += (numerator << Fixed::FRACTIONAL_BITS) / denominator;
        }
        if negative {
            raw = -raw;
        }
        i32::try_from(raw).ok().map(Fixed::from_raw)
    }

    /// Script view of the node: leaves become strings, inner nodes become
    /// objects keyed by child name with any text under `_string`.
    pub fn to_script_value(&self) -> ScriptValue {
        if self.children.is_empty() {
            return ScriptValue::String(self.value.clone());
        }
        let mut object = BTreeMap::new();
        if !self.value.trim().is_empty() {
            object.insert(
                "_string".to_string(),
                ScriptValue::String(self.value.clone()),
            );
        }
        for (name, child) in &self.children {
            object.insert(name.clone(), child.to_script_value());
        }
        ScriptValue::Object(object)
    }
}

pub(crate) fn is_attribute_name(name: &str) -> bool {
    name.starts_with('@')
}
