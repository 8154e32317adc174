use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use simcore_shared::{EntityId, ParamNode, TemplateManager};

/// Templates held in memory, keyed by name.
#[derive(Default)]
pub struct TestTemplateManager {
    templates: RefCell<BTreeMap<String, Rc<ParamNode>>>,
    latest: RefCell<BTreeMap<EntityId, String>>,
}

impl TestTemplateManager {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn insert(&self, name: &str, template: ParamNode) {
        self.templates
            .borrow_mut()
            .insert(name.to_string(), Rc::new(template));
    }

    /// The template `entity` was last built from.
    pub fn latest_template_name(&self, entity: EntityId) -> Option<String> {
        self.latest.borrow().get(&entity).cloned()
    }
}

impl TemplateManager for TestTemplateManager {
    fn load_template(
        &self,
        entity: EntityId,
        template_name: &str,
        _player: i32,
    ) -> Option<Rc<ParamNode>> {
        let template = self.get_template(template_name)?;
        self.latest
            .borrow_mut()
            .insert(entity, template_name.to_string());
        Some(template)
    }

    fn get_template(&self, template_name: &str) -> Option<Rc<ParamNode>> {
        self.templates.borrow().get(template_name).cloned()
    }

    fn load_latest_template(&self, entity: EntityId) -> Option<Rc<ParamNode>> {
        let name = self.latest.borrow().get(&entity).cloned()?;
        self.get_template(&name)
    }
}
