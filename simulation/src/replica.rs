use std::rc::Rc;

use log::error;

use simcore_shared::{
    ComponentManager, Fixed, MessageTurnStart, MessageUpdate, MessageUpdateFinal,
    MessageUpdateMotionFormation, MessageUpdateMotionUnit, NativeCatalog, ScriptRuntime,
    TemplateManager,
};

use crate::{CommandQueue, PlayerCommand, ScriptLoader, SimulationConfig, SimulationError, Vfs};

/// Asynchronous path computation, polled at fixed points of every turn.
///
/// Implementations may compute on other threads but must only touch the
/// component manager from within these calls.
pub trait Pathfinder {
    /// Collects results that became ready since the previous poll.
    fn fetch_async_results(&mut self, manager: &ComponentManager);

    fn update_grid(&mut self, manager: &ComponentManager);

    /// Starts computing the moves queued so far. With `use_max` the
    /// computation may be limited to a bounded amount of work.
    fn start_processing_moves(&mut self, manager: &ComponentManager, use_max: bool);

    fn send_requested_paths(&mut self, _manager: &ComponentManager) {}
}

/// Computer players running on this machine.
pub trait AiManager {
    /// Moves the commands computed since the previous turn into `queue`.
    fn push_commands(&mut self, manager: &ComponentManager, queue: &mut CommandQueue);

    /// Starts computing commands for a later turn from the current state.
    fn start_computation(&mut self, _manager: &ComponentManager) {}
}

/// The collaborators of one replica, built fresh by a [`ReplicaFactory`].
pub struct ReplicaParts {
    pub script_runtime: Rc<dyn ScriptRuntime>,
    pub template_manager: Rc<dyn TemplateManager>,
    pub catalog: NativeCatalog,
    pub pathfinder: Option<Box<dyn Pathfinder>>,
    pub ai_manager: Option<Box<dyn AiManager>>,
}

impl ReplicaParts {
    pub fn new(
        script_runtime: Rc<dyn ScriptRuntime>,
        template_manager: Rc<dyn TemplateManager>,
        catalog: NativeCatalog,
    ) -> Self {
        Self {
            script_runtime,
            template_manager,
            catalog,
            pathfinder: None,
            ai_manager: None,
        }
    }

    pub fn with_pathfinder(mut self, pathfinder: Box<dyn Pathfinder>) -> Self {
        self.pathfinder = Some(pathfinder);
        self
    }

    pub fn with_ai_manager(mut self, ai_manager: Box<dyn AiManager>) -> Self {
        self.ai_manager = Some(ai_manager);
        self
    }
}

/// Builds independent replicas of one simulation. Every call to
/// [`create_replica`](ReplicaFactory::create_replica) must return
/// collaborators that share no mutable state with earlier replicas, in
/// particular a separate script realm.
pub trait ReplicaFactory {
    fn create_replica(&self) -> Result<ReplicaParts, SimulationError>;

    /// Populates a freshly reset replica with the map's initial entities.
    fn load_map(&self, _manager: &ComponentManager) -> Result<(), SimulationError> {
        Ok(())
    }
}

/// One complete simulation: component manager, loaded scripts, command
/// queue and the optional pathfinder and AI hooks.
pub struct Replica {
    manager: ComponentManager,
    pathfinder: Option<Box<dyn Pathfinder>>,
    ai_manager: Option<Box<dyn AiManager>>,
    command_queue: CommandQueue,
    script_loader: ScriptLoader,
}

impl Replica {
    pub(crate) fn build(
        parts: ReplicaParts,
        vfs: Rc<dyn Vfs>,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let manager = ComponentManager::new(parts.script_runtime);
        manager.set_template_manager(parts.template_manager);
        manager.load_component_types(&parts.catalog)?;

        Ok(Self {
            manager,
            pathfinder: parts.pathfinder,
            ai_manager: parts.ai_manager,
            command_queue: CommandQueue::new(),
            script_loader: ScriptLoader::new(vfs, &config.script_extension),
        })
    }

    pub fn component_manager(&self) -> &ComponentManager {
        &self.manager
    }

    pub fn command_queue(&self) -> &CommandQueue {
        &self.command_queue
    }

    pub fn command_queue_mut(&mut self) -> &mut CommandQueue {
        &mut self.command_queue
    }

    pub fn script_loader(&self) -> &ScriptLoader {
        &self.script_loader
    }

    pub(crate) fn load_scripts(&mut self, directory: &str) -> Result<(), SimulationError> {
        self.script_loader.load_scripts(&self.manager, directory)
    }

    /// Loads every directory in order. All directories are attempted; the
    /// first failure is returned afterwards.
    pub(crate) fn load_default_scripts(
        &mut self,
        directories: &[String],
    ) -> Result<(), SimulationError> {
        let mut result = Ok(());
        for directory in directories {
            if let Err(err) = self.load_scripts(directory) {
                error!("Failed to load scripts from '{}': {}", directory, err);
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Clears all entities and recreates the system entity with its
    /// components.
    pub(crate) fn reset_state(&mut self, skip_scripted_components: bool) -> Result<(), SimulationError> {
        self.manager.reset_state();
        self.command_queue = CommandQueue::new();
        self.manager.init_system_entity()?;
        self.manager
            .add_system_components(skip_scripted_components)?;
        Ok(())
    }

    /// Runs one turn. The phase order is fixed: later phases rely on the
    /// work of earlier ones (motion runs after moves were queued and
    /// computed).
    pub(crate) fn update_components(&mut self, turn_length: Fixed, commands: &[PlayerCommand]) {
        let manager = &self.manager;

        manager.broadcast_message(&MessageTurnStart);

        if let Some(pathfinder) = self.pathfinder.as_mut() {
            pathfinder.fetch_async_results(manager);
            pathfinder.update_grid(manager);
        }

        if let Some(ai_manager) = self.ai_manager.as_mut() {
            ai_manager.push_commands(manager, &mut self.command_queue);
        }

        self.command_queue.flush_turn(manager, commands);

        // Moves issued by this turn's commands.
        if let Some(pathfinder) = self.pathfinder.as_mut() {
            pathfinder.start_processing_moves(manager, true);
            pathfinder.send_requested_paths(manager);
        }

        manager.broadcast_message(&MessageUpdate::new(turn_length));
        manager.broadcast_message(&MessageUpdateMotionFormation::new(turn_length));

        // Moves of formation members.
        if let Some(pathfinder) = self.pathfinder.as_mut() {
            pathfinder.start_processing_moves(manager, true);
            pathfinder.send_requested_paths(manager);
        }

        manager.broadcast_message(&MessageUpdateMotionUnit::new(turn_length));
        manager.broadcast_message(&MessageUpdateFinal::new(turn_length));

        manager.flush_destroyed_components();

        if let Some(pathfinder) = self.pathfinder.as_mut() {
            pathfinder.update_grid(manager);
            pathfinder.start_processing_moves(manager, false);
        }

        if let Some(ai_manager) = self.ai_manager.as_mut() {
            ai_manager.start_computation(manager);
        }
    }
}
