//! Collaborators the run driver talks to: filesystem, clock and console.
//! Passing them in keeps the pipeline free of global state and lets tests
//! substitute fakes.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// FileSystem
// ---------------------------------------------------------------------------

pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Entry names (not paths) of a directory, unsorted.
    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>>;
    fn is_file(&self, path: &Path) -> bool;
    fn exists(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
    fn current_dir(&self) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        crate::io::atomic_write(path, data)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        crate::io::ensure_dir(path)
    }

    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        Ok(std::fs::canonicalize(path)?)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(std::env::current_dir()?)
    }
}

/// Resolves relative paths against `base` instead of the process working
/// directory.
#[derive(Debug, Clone)]
pub struct RootedFileSystem {
    base: PathBuf,
}

impl RootedFileSystem {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn at(&self, path: &Path) -> PathBuf {
        self.base.join(path)
    }
}

impl FileSystem for RootedFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        OsFileSystem.read_to_string(&self.at(path))
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        OsFileSystem.write_atomic(&self.at(path), data)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        OsFileSystem.create_dir_all(&self.at(path))
    }

    fn read_dir_names(&self, path: &Path) -> Result<Vec<String>> {
        OsFileSystem.read_dir_names(&self.at(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.at(path).is_file()
    }

    fn exists(&self, path: &Path) -> bool {
        self.at(path).exists()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        OsFileSystem.canonicalize(&self.at(path))
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.base.clone())
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// User-facing output. Progress goes to `info`; problems to `warn`/`error`.
pub trait Console {
    fn info(&self, line: &str);
    fn warn(&self, line: &str);
    fn error(&self, line: &str);
}

/// stdout for progress, stderr for warnings and errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn info(&self, line: &str) {
        println!("{line}");
    }

    fn warn(&self, line: &str) {
        eprintln!("{line}");
    }

    fn error(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Everything on stderr. Used when stdout carries machine-readable output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrConsole;

impl Console for StderrConsole {
    fn info(&self, line: &str) {
        eprintln!("{line}");
    }

    fn warn(&self, line: &str) {
        eprintln!("{line}");
    }

    fn error(&self, line: &str) {
        eprintln!("{line}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Info,
    Warn,
    Error,
}

/// Records every line in memory.
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: RefCell<Vec<(ConsoleLevel, String)>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(ConsoleLevel, String)> {
        self.lines.borrow().clone()
    }

    pub fn at(&self, level: ConsoleLevel) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    fn record(&self, level: ConsoleLevel, line: &str) {
        self.lines.borrow_mut().push((level, line.to_string()));
    }
}

impl Console for BufferConsole {
    fn info(&self, line: &str) {
        self.record(ConsoleLevel::Info, line);
    }

    fn warn(&self, line: &str) {
        self.record(ConsoleLevel::Warn, line);
    }

    fn error(&self, line: &str) {
        self.record(ConsoleLevel::Error, line);
    }
}
