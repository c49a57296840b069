use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::{fs, io::ErrorKind};
use uuid::Uuid;

/// Key under which the entry collection is persisted.
pub const ENTRIES_KEY: &str = "better_entries_v1";

/// Raw byte-level key-value persistence.
///
/// `get` returns `Ok(None)` for a key that was never written; `Err` is
/// reserved for real I/O failures.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    fn set(&mut self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;

        // Write to a sibling temp file and rename so readers never see a partial blob.
        let tmp = self.root.join(format!(".{key}-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, bytes)?;
        if let Err(err) = fs::rename(&tmp, self.path_for(key)) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        Ok(())
    }
}

/// In-memory store for tests; can be told to fail every write.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), bytes.into());
        store
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.values.get(key).map(Vec::as_slice)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("simulated write failure"));
        }
        self.values.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
