use std::{collections::BTreeSet, rc::Rc};

use log::{error, info};

use simcore_shared::ComponentManager;

use crate::{SimulationError, Vfs};

/// Loads simulation scripts from the VFS into a component manager and
/// remembers which paths were loaded, so changed files can be reloaded.
pub struct ScriptLoader {
    vfs: Rc<dyn Vfs>,
    extension: String,
    loaded_scripts: BTreeSet<String>,
}

impl ScriptLoader {
    pub fn new(vfs: Rc<dyn Vfs>, extension: &str) -> Self {
        Self {
            vfs,
            extension: extension.to_string(),
            loaded_scripts: BTreeSet::new(),
        }
    }

    pub fn vfs(&self) -> &Rc<dyn Vfs> {
        &self.vfs
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.loaded_scripts.contains(path)
    }

    pub fn loaded_scripts(&self) -> impl Iterator<Item = &str> {
        self.loaded_scripts.iter().map(String::as_str)
    }

    /// Loads every script in `directory`, in path order. Every file is
    /// attempted; the first failure is returned afterwards.
    pub fn load_scripts(
        &mut self,
        manager: &ComponentManager,
        directory: &str,
    ) -> Result<(), SimulationError> {
        let mut paths = self.vfs.list_files(directory, &self.extension)?;
        paths.sort();

        let mut result = Ok(());
        for path in paths {
            self.loaded_scripts.insert(path.clone());
            if let Err(err) = self.load_script(manager, &path, false) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Loads a single script file.
    pub fn load_script(
        &self,
        manager: &ComponentManager,
        path: &str,
        hotload: bool,
    ) -> Result<(), SimulationError> {
        let bytes = self.vfs.load_file(path).map_err(|err| {
            error!("Failed to load simulation script '{}': {}", path, err);
            err
        })?;
        let Ok(source) = String::from_utf8(bytes) else {
            error!("Simulation script '{}' is not valid UTF-8", path);
            return Err(SimulationError::InvalidScriptEncoding {
                path: path.to_string(),
            });
        };
        manager.load_script(path, &source, hotload)?;
        Ok(())
    }

    /// Reloads `path` in hotload mode if it was loaded before and still
    /// exists; otherwise does nothing.
    pub fn reload_changed_file(
        &self,
        manager: &ComponentManager,
        path: &str,
    ) -> Result<(), SimulationError> {
        if !self.is_loaded(path) || !self.vfs.exists(path) {
            return Ok(());
        }
        info!("Reloading simulation script '{}'", path);
        self.load_script(manager, path, true).map_err(|err| {
            error!("Failed to reload simulation script '{}': {}", path, err);
            err
        })
    }
}
