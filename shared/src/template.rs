use std::rc::Rc;

use crate::{types::EntityId, ParamNode};

/// Source of entity templates.
///
/// Templates are looked up by name; the manager remembers which template
/// each entity was built from so deserialization can reconstruct component
/// parameters.
pub trait TemplateManager {
    /// Loads `template_name` for `entity` (owned by `player`, or -1) and
    /// records the association.
    fn load_template(
        &self,
        entity: EntityId,
        template_name: &str,
        player: i32,
    ) -> Option<Rc<ParamNode>>;

    fn get_template(&self, template_name: &str) -> Option<Rc<ParamNode>>;

    /// The template most recently loaded for `entity`.
    fn load_latest_template(&self, entity: EntityId) -> Option<Rc<ParamNode>>;
}
