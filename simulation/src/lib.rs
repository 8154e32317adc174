//! # Simcore Simulation
//! Turn driver for a simcore component manager: runs the fixed sequence of
//! update phases, executes player commands through scripts, loads and
//! hot-reloads simulation scripts, and verifies determinism by replaying
//! turns on independent replicas.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use simcore_shared::{
        ComponentManager, Fixed, ScriptRuntime, ScriptValue, StateHash, TemplateManager,
    };
}

mod command_queue;
mod error;
mod progressive_load;
mod replica;
mod script_loader;
mod simulation;
mod simulation_config;
mod timestamp;
mod vfs;

pub use command_queue::{CommandQueue, PlayerCommand, PROCESS_COMMAND_FUNCTION};
pub use error::{DesyncPhase, SimulationError, TimeError, VfsError};
pub use progressive_load::{LoadProgress, ProgressiveLoader, TaskProgress};
pub use replica::{AiManager, Pathfinder, Replica, ReplicaFactory, ReplicaParts};
pub use script_loader::ScriptLoader;
pub use simulation::Simulation;
pub use simulation_config::SimulationConfig;
pub use timestamp::Timestamp;
pub use vfs::Vfs;
