use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{error, info, warn};

use simcore_shared::{ComponentManager, Fixed, MessageInterpolate, ScriptValue, StateHash};

use crate::{
    timestamp::Timestamp, DesyncPhase, LoadProgress, PlayerCommand, ProgressiveLoader, Replica,
    ReplicaFactory, SimulationConfig, SimulationError, Vfs,
};

/// Serialized state, debug dump and hash of a replica at one point in time.
struct StateSnapshot {
    state: Vec<u8>,
    debug: String,
    hash: StateHash,
}

impl StateSnapshot {
    fn capture(manager: &ComponentManager) -> Result<Self, SimulationError> {
        Ok(Self {
            state: manager.serialize_state()?,
            debug: manager.dump_debug_state(true)?,
            hash: manager.compute_state_hash(false)?,
        })
    }

    fn matches(&self, other: &StateSnapshot) -> bool {
        self.state == other.state && self.hash == other.hash
    }
}

/// The four snapshots compared by the determinism tests. `a` is the
/// primary replica, `b` the secondary.
#[derive(Default)]
struct DesyncReport<'a> {
    before_a: Option<&'a StateSnapshot>,
    after_a: Option<&'a StateSnapshot>,
    before_b: Option<&'a StateSnapshot>,
    after_b: Option<&'a StateSnapshot>,
}

/// Drives a simulation turn by turn and, when enabled, checks it for
/// nondeterminism against independent replicas.
pub struct Simulation {
    config: SimulationConfig,
    factory: Rc<dyn ReplicaFactory>,
    vfs: Rc<dyn Vfs>,
    primary: Replica,
    rejoin_replica: Option<Replica>,
    loaded_directories: Vec<String>,
    turn_number: u32,
}

impl Simulation {
    /// Builds the primary replica and registers its native component
    /// types. Scripts are not loaded and no entity exists yet.
    pub fn new(
        config: SimulationConfig,
        factory: Rc<dyn ReplicaFactory>,
        vfs: Rc<dyn Vfs>,
    ) -> Result<Self, SimulationError> {
        let parts = factory.create_replica()?;
        let primary = Replica::build(parts, vfs.clone(), &config)?;
        Ok(Self {
            config,
            factory,
            vfs,
            primary,
            rejoin_replica: None,
            loaded_directories: Vec::new(),
            turn_number: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn replica(&self) -> &Replica {
        &self.primary
    }

    pub fn component_manager(&self) -> &ComponentManager {
        self.primary.component_manager()
    }

    /// The secondary replica of the rejoin test, once started.
    pub fn rejoin_replica(&self) -> Option<&Replica> {
        self.rejoin_replica.as_ref()
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    // Scripts

    pub fn load_scripts(&mut self, directory: &str) -> Result<(), SimulationError> {
        self.loaded_directories.push(directory.to_string());
        self.primary.load_scripts(directory)
    }

    /// Loads the configured script directories in order.
    pub fn load_default_scripts(&mut self) -> Result<(), SimulationError> {
        let directories = self.config.script_directories.clone();
        self.loaded_directories.extend(directories.iter().cloned());
        self.primary.load_default_scripts(&directories)
    }

    /// Reloads a changed script in hotload mode. Paths that were never
    /// loaded as scripts, or no longer exist, are ignored.
    pub fn reload_changed_file(&mut self, path: &str) -> Result<(), SimulationError> {
        self.primary
            .script_loader()
            .reload_changed_file(self.primary.component_manager(), path)
    }

    /// Reloads every script the VFS reports as changed. All changes are
    /// attempted; the first failure is returned afterwards.
    pub fn poll_file_changes(&mut self) -> Result<(), SimulationError> {
        let mut result = Ok(());
        for path in self.vfs.poll_changes() {
            if let Err(err) = self.reload_changed_file(&path) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    // State

    /// Destroys every entity, recreates the system entity with its
    /// components and restarts turn counting.
    pub fn reset_state(&mut self, skip_scripted_components: bool) -> Result<(), SimulationError> {
        self.turn_number = 0;
        self.rejoin_replica = None;
        self.primary.reset_state(skip_scripted_components)
    }

    pub fn serialize_state(&self) -> Result<Vec<u8>, SimulationError> {
        Ok(self.component_manager().serialize_state()?)
    }

    pub fn deserialize_state(&mut self, bytes: &[u8]) -> Result<(), SimulationError> {
        self.rejoin_replica = None;
        Ok(self.component_manager().deserialize_state(bytes)?)
    }

    pub fn compute_state_hash(&self, quick: bool) -> Result<StateHash, SimulationError> {
        Ok(self.component_manager().compute_state_hash(quick)?)
    }

    pub fn dump_debug_state(&self, include_debug_info: bool) -> Result<String, SimulationError> {
        Ok(self.component_manager().dump_debug_state(include_debug_info)?)
    }

    // Turns

    /// Queues a command from a player on this machine for the next turn.
    pub fn push_local_command(&mut self, player: i32, data: ScriptValue) {
        self.primary
            .command_queue_mut()
            .push_local_command(player, data);
    }

    /// Runs one turn with the players' `commands`, then the enabled
    /// determinism tests, garbage collection and out-of-sync logging.
    pub fn update(
        &mut self,
        turn_length: Fixed,
        commands: &[PlayerCommand],
    ) -> Result<(), SimulationError> {
        let start_rejoin =
            self.rejoin_replica.is_none() && self.config.rejoin_test_turn == Some(self.turn_number);
        let before = if self.config.serialization_test || start_rejoin {
            let snapshot = StateSnapshot::capture(self.component_manager())?;
            let local_commands = self.primary.command_queue().local_commands().to_vec();
            Some((snapshot, local_commands))
        } else {
            None
        };

        self.primary.update_components(turn_length, commands);

        if let Some((primary_before, local_commands)) = &before {
            if start_rejoin {
                info!("Starting rejoin test at turn {}", self.turn_number);
                let (replica, secondary_before) =
                    self.build_secondary(&primary_before.state, local_commands, true)?;
                if !primary_before.matches(&secondary_before) {
                    report_desync(
                        &self.config,
                        DesyncPhase::Deserialization,
                        DesyncReport {
                            before_a: Some(primary_before),
                            before_b: Some(&secondary_before),
                            ..DesyncReport::default()
                        },
                    )?;
                }
                self.rejoin_replica = Some(replica);
            }
            if self.config.serialization_test {
                self.run_serialization_test(primary_before, local_commands, turn_length, commands)?;
            }
        }

        if let Some(replica) = self.rejoin_replica.as_mut() {
            let runtime = replica.component_manager().script_runtime().clone();
            let commands: Vec<PlayerCommand> = commands
                .iter()
                .map(|command| command.clone_into(runtime.as_ref()))
                .collect();
            replica.update_components(turn_length, &commands);

            let primary_after = StateSnapshot::capture(self.primary.component_manager())?;
            let secondary_after = StateSnapshot::capture(replica.component_manager())?;
            if !primary_after.matches(&secondary_after) {
                report_desync(
                    &self.config,
                    DesyncPhase::Rejoin,
                    DesyncReport {
                        after_a: Some(&primary_after),
                        after_b: Some(&secondary_after),
                        ..DesyncReport::default()
                    },
                )?;
            }
        }

        self.turn_number += 1;
        self.collect_garbage();

        if self.config.oos_log {
            self.dump_oos_log()?;
        }
        Ok(())
    }

    /// Broadcasts `Interpolate` for a rendered frame between two turns.
    pub fn interpolate(&self, sim_frame_length: f32, frame_offset: f32, real_frame_length: f32) {
        self.component_manager().broadcast_message(&MessageInterpolate {
            delta_sim_time: sim_frame_length,
            offset: frame_offset,
            delta_real_time: real_frame_length,
        });
    }

    /// Runs `loader` for up to the configured wall clock budget.
    pub fn progressive_load(
        &mut self,
        loader: &mut ProgressiveLoader<Simulation>,
    ) -> Result<LoadProgress, SimulationError> {
        let budget = self.config.progressive_load_budget;
        loader.progressive_load(self, budget)
    }

    // Determinism tests

    /// Builds a fresh replica holding `state`. With `load_map` the factory
    /// first populates it from the map, as a rejoining client would.
    fn build_secondary(
        &self,
        state: &[u8],
        local_commands: &[PlayerCommand],
        load_map: bool,
    ) -> Result<(Replica, StateSnapshot), SimulationError> {
        let parts = self.factory.create_replica()?;
        let mut replica = Replica::build(parts, self.vfs.clone(), &self.config)?;
        for directory in &self.loaded_directories {
            if let Err(err) = replica.load_scripts(directory) {
                warn!("Secondary replica failed to load scripts from '{}': {}", directory, err);
            }
        }

        if load_map {
            replica.reset_state(false)?;
            self.factory.load_map(replica.component_manager())?;
        }
        replica.component_manager().deserialize_state(state)?;

        let runtime = replica.component_manager().script_runtime().clone();
        for command in local_commands {
            let command = command.clone_into(runtime.as_ref());
            replica
                .command_queue_mut()
                .push_local_command(command.player, command.data);
        }

        let snapshot = StateSnapshot::capture(replica.component_manager())?;
        Ok((replica, snapshot))
    }

    fn run_serialization_test(
        &self,
        primary_before: &StateSnapshot,
        local_commands: &[PlayerCommand],
        turn_length: Fixed,
        commands: &[PlayerCommand],
    ) -> Result<(), SimulationError> {
        let (mut secondary, secondary_before) =
            self.build_secondary(&primary_before.state, local_commands, false)?;

        if !primary_before.matches(&secondary_before) {
            return report_desync(
                &self.config,
                DesyncPhase::Deserialization,
                DesyncReport {
                    before_a: Some(primary_before),
                    before_b: Some(&secondary_before),
                    ..DesyncReport::default()
                },
            );
        }

        let primary_after = StateSnapshot::capture(self.component_manager())?;

        let runtime = secondary.component_manager().script_runtime().clone();
        let commands: Vec<PlayerCommand> = commands
            .iter()
            .map(|command| command.clone_into(runtime.as_ref()))
            .collect();
        secondary.update_components(turn_length, &commands);

        let secondary_after = StateSnapshot::capture(secondary.component_manager())?;

        if !primary_after.matches(&secondary_after) {
            return report_desync(
                &self.config,
                DesyncPhase::TurnExecution,
                DesyncReport {
                    before_a: Some(primary_before),
                    after_a: Some(&primary_after),
                    before_b: Some(&secondary_before),
                    after_b: Some(&secondary_after),
                },
            );
        }
        Ok(())
    }

    // Housekeeping

    fn collect_garbage(&self) {
        let runtime = self.component_manager().script_runtime();
        let interval = self.config.full_gc_interval;
        if interval != 0 && self.turn_number % interval == 0 {
            runtime.shrinking_gc();
        } else {
            runtime.incremental_gc();
        }
    }

    fn dump_oos_log(&self) -> Result<(), SimulationError> {
        let directory = self.config.log_dir.join("oos_log");
        create_dir(&directory)?;

        let hash = self.compute_state_hash(false)?;
        let dump = self.dump_debug_state(true)?;
        let text = format!("State hash: {}\n\n{}", hash.to_hex(), dump);
        write_file(&directory.join(format!("{:05}.txt", self.turn_number)), text.as_bytes())?;

        let state = self.serialize_state()?;
        write_file(&directory.join(format!("{:05}.dat", self.turn_number)), &state)
    }
}

/// Writes the snapshots into a fresh dump directory. Returns
/// `SimulationError::Desync` when desyncs are fatal.
fn report_desync(
    config: &SimulationConfig,
    phase: DesyncPhase,
    report: DesyncReport<'_>,
) -> Result<(), SimulationError> {
    let dump_dir = create_date_index_subdirectory(&config.log_dir.join("serializationtest"))?;

    let snapshots = [
        ("before.a", report.before_a),
        ("after.a", report.after_a),
        ("before.b", report.before_b),
        ("after.b", report.after_b),
    ];
    for (suffix, snapshot) in snapshots {
        let Some(snapshot) = snapshot else {
            continue;
        };
        write_file(
            &dump_dir.join(format!("hash.{}", suffix)),
            snapshot.hash.to_hex().as_bytes(),
        )?;
        write_file(
            &dump_dir.join(format!("debug.{}", suffix)),
            snapshot.debug.as_bytes(),
        )?;
        write_file(&dump_dir.join(format!("state.{}", suffix)), &snapshot.state)?;
    }

    error!(
        "Serialization test failure during {}; state dumped to {:?}",
        phase, dump_dir
    );

    if config.abort_on_desync {
        Err(SimulationError::Desync { phase, dump_dir })
    } else {
        Ok(())
    }
}

/// Creates `<base>/<YYYY-MM-DD>_<NNNN>` with the first unused index.
fn create_date_index_subdirectory(base: &Path) -> Result<PathBuf, SimulationError> {
    create_dir(base)?;
    let date = Timestamp::try_today()?;
    let mut index = 1u32;
    loop {
        let candidate = base.join(format!("{}_{:04}", date, index));
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => index += 1,
            Err(source) => {
                return Err(SimulationError::Io {
                    path: candidate,
                    source,
                })
            }
        }
    }
}

fn create_dir(path: &Path) -> Result<(), SimulationError> {
    fs::create_dir_all(path).map_err(|source| SimulationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), SimulationError> {
    fs::write(path, contents).map_err(|source| SimulationError::Io {
        path: path.to_path_buf(),
        source,
    })
}
