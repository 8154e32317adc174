use std::{collections::BTreeMap, fmt::Write};

use crate::ComponentTypeRegistry;

const GRAMMAR_HEADER: &str = "<grammar xmlns='http://relaxng.org/ns/structure/1.0' \
datatypeLibrary='http://www.w3.org/2001/XMLSchema-datatypes'>\
<define name='decimal'><data type='decimal'/></define>\
<define name='nonNegativeDecimal'><data type='decimal'><param name='minInclusive'>0</param></data></define>\
<define name='positiveDecimal'><data type='decimal'><param name='minExclusive'>0</param></data></define>\
<define name='anything'><zeroOrMore><choice><attribute><anyName/></attribute><text/>\
<element><anyName/><ref name='anything'/></element></choice></zeroOrMore></define>";

impl ComponentTypeRegistry {
    /// RelaxNG grammar validating entity templates: one rule per component
    /// type, one choice rule per interface, and an `Entity` root accepting
    /// any subset of component elements. Output depends only on registered
    /// names, never on registration order.
    pub fn generate_schema(&self) -> String {
        let mut component_names: Vec<&str> = Vec::new();
        let mut by_interface: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (_, record) in self.component_types() {
            component_names.push(&record.name);
            if let Some(interface) = self.interface_name(record.interface) {
                by_interface.entry(interface).or_default().push(&record.name);
            }
        }
        component_names.sort_unstable();

        let mut schema = String::from(GRAMMAR_HEADER);
        for name in &component_names {
            let Some(record) = self
                .component_type_id(name)
                .and_then(|id| self.component_type(id))
            else {
                continue;
            };
            let _ = write!(
                schema,
                "<define name='component.{name}'><element name='{name}'><interleave>{}</interleave></element></define>",
                record.schema
            );
        }

        for (interface, names) in &mut by_interface {
            names.sort_unstable();
            let _ = write!(schema, "<define name='interface.{interface}'><choice>");
            for name in names.iter() {
                let _ = write!(schema, "<ref name='component.{name}'/>");
            }
            schema.push_str("</choice></define>");
        }

        schema.push_str(
            "<start><element name='Entity'><optional><attribute name='parent'/></optional><interleave>",
        );
        for name in &component_names {
            let _ = write!(schema, "<optional><ref name='component.{name}'/></optional>");
        }
        schema.push_str("</interleave></element></start></grammar>");
        schema
    }
}
