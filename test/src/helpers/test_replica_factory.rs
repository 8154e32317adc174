use std::{cell::RefCell, rc::Rc};

use simcore_shared::{ComponentManager, ParamNode};
use simcore_simulation::{AiManager, Pathfinder, ReplicaFactory, ReplicaParts, SimulationError};

use super::{test_catalog, TestScriptRuntime, TestTemplateManager};

type RuntimeSetup = Rc<dyn Fn(&TestScriptRuntime)>;
type MapLoader = Rc<dyn Fn(&ComponentManager) -> Result<(), SimulationError>>;

/// Builds replicas from the test catalog. Every replica gets its own script
/// realm, prepared by the setup closure, and its own template manager.
pub struct TestReplicaFactory {
    setup: RuntimeSetup,
    templates: Vec<(String, ParamNode)>,
    pathfinder: Option<Rc<dyn Fn() -> Box<dyn Pathfinder>>>,
    ai_manager: Option<Rc<dyn Fn() -> Box<dyn AiManager>>>,
    map_loader: Option<MapLoader>,
    runtimes: RefCell<Vec<Rc<TestScriptRuntime>>>,
    map_loads: RefCell<u32>,
}

impl TestReplicaFactory {
    pub fn new(setup: impl Fn(&TestScriptRuntime) + 'static) -> Self {
        Self {
            setup: Rc::new(setup),
            templates: Vec::new(),
            pathfinder: None,
            ai_manager: None,
            map_loader: None,
            runtimes: RefCell::new(Vec::new()),
            map_loads: RefCell::new(0),
        }
    }

    pub fn with_template(mut self, name: &str, template: ParamNode) -> Self {
        self.templates.push((name.to_string(), template));
        self
    }

    pub fn with_pathfinder(mut self, pathfinder: impl Fn() -> Box<dyn Pathfinder> + 'static) -> Self {
        self.pathfinder = Some(Rc::new(pathfinder));
        self
    }

    pub fn with_ai_manager(mut self, ai_manager: impl Fn() -> Box<dyn AiManager> + 'static) -> Self {
        self.ai_manager = Some(Rc::new(ai_manager));
        self
    }

    pub fn with_map_loader(
        mut self,
        map_loader: impl Fn(&ComponentManager) -> Result<(), SimulationError> + 'static,
    ) -> Self {
        self.map_loader = Some(Rc::new(map_loader));
        self
    }

    /// Script runtime of the `index`th replica built, the primary first.
    pub fn runtime(&self, index: usize) -> Option<Rc<TestScriptRuntime>> {
        self.runtimes.borrow().get(index).cloned()
    }

    pub fn replicas_built(&self) -> usize {
        self.runtimes.borrow().len()
    }

    pub fn map_loads(&self) -> u32 {
        *self.map_loads.borrow()
    }
}

impl ReplicaFactory for TestReplicaFactory {
    fn create_replica(&self) -> Result<ReplicaParts, SimulationError> {
        let runtime = TestScriptRuntime::new();
        (self.setup)(&runtime);
        self.runtimes.borrow_mut().push(runtime.clone());

        let template_manager = TestTemplateManager::new();
        for (name, template) in &self.templates {
            template_manager.insert(name, template.clone());
        }

        let mut parts = ReplicaParts::new(runtime, template_manager, test_catalog());
        if let Some(pathfinder) = &self.pathfinder {
            parts = parts.with_pathfinder(pathfinder());
        }
        if let Some(ai_manager) = &self.ai_manager {
            parts = parts.with_ai_manager(ai_manager());
        }
        Ok(parts)
    }

    fn load_map(&self, manager: &ComponentManager) -> Result<(), SimulationError> {
        *self.map_loads.borrow_mut() += 1;
        match &self.map_loader {
            Some(map_loader) => map_loader(manager),
            None => Ok(()),
        }
    }
}
