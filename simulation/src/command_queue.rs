use log::error;

use simcore_shared::{ComponentManager, ScriptRuntime, ScriptValue};

/// Name of the global script function that executes a player command.
pub const PROCESS_COMMAND_FUNCTION: &str = "ProcessCommand";

/// A command issued by a player for one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerCommand {
    pub player: i32,
    pub data: ScriptValue,
}

impl PlayerCommand {
    pub fn new(player: i32, data: ScriptValue) -> Self {
        Self { player, data }
    }

    /// Copies this command into another script realm.
    pub fn clone_into(&self, runtime: &dyn ScriptRuntime) -> Self {
        Self {
            player: self.player,
            data: runtime.clone_value_from(&self.data),
        }
    }
}

/// Commands waiting for the next turn.
///
/// Local commands (issued by AI players on this machine) are queued here;
/// network commands for the turn are passed straight to
/// [`flush_turn`](CommandQueue::flush_turn).
#[derive(Default)]
pub struct CommandQueue {
    local_commands: Vec<PlayerCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_local_command(&mut self, player: i32, data: ScriptValue) {
        self.local_commands.push(PlayerCommand::new(player, data));
    }

    pub fn local_commands(&self) -> &[PlayerCommand] {
        &self.local_commands
    }

    /// Executes the queued local commands, then `commands`, through the
    /// script `ProcessCommand(player, data)` function. A failing command is
    /// logged and the rest still run.
    pub fn flush_turn(&mut self, manager: &ComponentManager, commands: &[PlayerCommand]) {
        let local_commands = std::mem::take(&mut self.local_commands);
        for command in local_commands.iter().chain(commands) {
            let args = [ScriptValue::Int(command.player), command.data.clone()];
            if let Err(err) =
                manager
                    .script_runtime()
                    .call_function(manager, PROCESS_COMMAND_FUNCTION, &args)
            {
                error!(
                    "Failed to call {}() global script function for player {}: {}",
                    PROCESS_COMMAND_FUNCTION, command.player, err
                );
            }
        }
    }
}
