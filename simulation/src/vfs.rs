use crate::VfsError;

/// Read-only view of the game's file system, used for script loading and
/// hot reload.
pub trait Vfs {
    fn load_file(&self, path: &str) -> Result<Vec<u8>, VfsError>;

    fn exists(&self, path: &str) -> bool;

    /// Paths of the files under `directory` with the given extension.
    fn list_files(&self, directory: &str, extension: &str) -> Result<Vec<String>, VfsError>;

    /// Paths changed since the previous poll.
    fn poll_changes(&self) -> Vec<String> {
        Vec::new()
    }
}
