use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use simcore_simulation::{Vfs, VfsError};

/// A file system held in memory. Writes are reported by `poll_changes`.
#[derive(Default)]
pub struct TestVfs {
    files: RefCell<BTreeMap<String, Vec<u8>>>,
    changes: RefCell<Vec<String>>,
}

impl TestVfs {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn write_file(&self, path: &str, contents: &str) {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.as_bytes().to_vec());
        self.changes.borrow_mut().push(path.to_string());
    }

    pub fn write_bytes(&self, path: &str, contents: &[u8]) {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_vec());
        self.changes.borrow_mut().push(path.to_string());
    }

    pub fn remove_file(&self, path: &str) {
        self.files.borrow_mut().remove(path);
        self.changes.borrow_mut().push(path.to_string());
    }

    /// Forgets pending change notifications.
    pub fn clear_changes(&self) {
        self.changes.borrow_mut().clear();
    }
}

impl Vfs for TestVfs {
    fn load_file(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound {
                path: path.to_string(),
            })
    }

    fn exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn list_files(&self, directory: &str, extension: &str) -> Result<Vec<String>, VfsError> {
        let suffix = format!(".{}", extension);
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|path| {
                path.strip_prefix(directory)
                    .is_some_and(|rest| !rest.contains('/') && rest.ends_with(&suffix))
            })
            .cloned()
            .collect())
    }

    fn poll_changes(&self) -> Vec<String> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }
}
