// --- Persistent slot: one named JSON value, replaced wholesale on write ---

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use tempfile::NamedTempFile; // For atomic writes

/// Key the browser app stored its collection under.
pub const DEFAULT_KEY: &str = "todos";

/// A single durable key-value entry.
pub trait Slot {
    /// Current contents, `None` when nothing was ever written.
    fn read(&mut self) -> Result<Option<String>>;

    /// Replace the contents.
    fn write(&mut self, contents: &str) -> Result<()>;
}

// --- File backed slot: `<dir>/<key>.json` ---

/// The first `read` or `write` takes an exclusive lock on `<dir>/<key>.lock`
/// and keeps it until the slot is dropped, so a whole load-mutate-save cycle
/// runs without another process interleaving.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
    lock_path: PathBuf,
    lock: Option<File>,
}

impl FileSlot {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            path: dir.join(format!("{key}.json")),
            lock_path: dir.join(format!("{key}.lock")),
            lock: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Blocks until no other slot on the same key holds the lock.
    fn ensure_locked(&mut self) -> Result<()> {
        if self.lock.is_some() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        self.lock = Some(lock_file(&self.lock_path)?);
        Ok(())
    }
}

impl Slot for FileSlot {
    fn read(&mut self) -> Result<Option<String>> {
        self.ensure_locked()?;
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading slot {}", self.path.display())),
        }
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.ensure_locked()?;
        atomic_write(&self.path, contents.as_bytes())
            .with_context(|| format!("writing slot {}", self.path.display()))
    }
}

// --- In-process slot ---
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Option<String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that already holds `contents`, as if written by an earlier run.
    pub fn with_contents<S: Into<String>>(contents: S) -> Self {
        Self {
            value: Some(contents.into()),
            writes: 0,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Number of writes since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Slot for MemorySlot {
    fn read(&mut self) -> Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.value = Some(contents.to_owned());
        self.writes += 1;
        Ok(())
    }
}

/// Replace `path` with `bytes` only once the whole payload is safely on disk.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    // Write into a temp file in the *same* directory.
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).context("create temp file")?;

    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;

    // atomic rename on POSIX, safe fallback on Windows
    tmp.persist(path)
        .with_context(|| format!("persist {}", path.display()))?;

    Ok(())
}

// --- Internal Helper: advisory locking ---
fn lock_file(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("opening lock file {}", path.display()))?;
    FileExt::lock_exclusive(&file)
        .with_context(|| format!("locking {}", path.display()))?;
    Ok(file)
}
