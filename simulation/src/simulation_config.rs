use std::{default::Default, path::PathBuf, time::Duration};

/// Contains Config properties which will be used by the Simulation
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Re-run every turn on a freshly deserialized replica and compare the
    /// results with the primary
    pub serialization_test: bool,
    /// Start a secondary replica from the primary's state at this turn and
    /// compare the two after every following turn
    pub rejoin_test_turn: Option<u32>,
    /// Write the state hash, a debug dump and the binary state after every
    /// turn
    pub oos_log: bool,
    /// Root directory for the out-of-sync log and desync diagnostics
    pub log_dir: PathBuf,
    /// Whether a detected desync fails the turn. When false the desync is
    /// only logged and dumped.
    pub abort_on_desync: bool,
    /// A shrinking garbage collection runs every this many turns; other
    /// turns run an incremental one. Zero disables shrinking collections.
    pub full_gc_interval: u32,
    /// Wall clock time a single progressive load call may spend
    pub progressive_load_budget: Duration,
    /// Directories loaded by `load_default_scripts`, in order
    pub script_directories: Vec<String>,
    /// File extension of simulation scripts, without the dot
    pub script_extension: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            serialization_test: false,
            rejoin_test_turn: None,
            oos_log: false,
            log_dir: PathBuf::from("./logs"),
            abort_on_desync: true,
            full_gc_interval: 500,
            progressive_load_budget: Duration::from_millis(200),
            script_directories: vec![
                "simulation/components/interfaces/".to_string(),
                "simulation/helpers/".to_string(),
                "simulation/components/".to_string(),
            ],
            script_extension: "js".to_string(),
        }
    }
}
