//! Shared test fixtures for capture-session and import test modules.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::capture::signal::{completion_channel, CompletionWaiter};
use crate::capture::store::CaptureStore;
use crate::capture::{CaptureBuffer, CaptureSession, CommandTable};
use crate::ledger::LedgerFormatter;

/// In-memory capture store whose clones share contents, so a test can keep
/// one handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Arc<Mutex<String>>,
    writes: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn contents(&self) -> String {
        self.contents.lock().expect("store lock").clone()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl CaptureStore for MemoryStore {
    fn location(&self) -> &Path {
        Path::new("memory.ledger-cap")
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("disk full"));
        }
        *self.contents.lock().expect("store lock") = text.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build a pending session over `lines` with the default formatter and keys.
pub fn session_over(lines: &[&str]) -> (CaptureSession, MemoryStore, CompletionWaiter) {
    let store = MemoryStore::default();
    let (signal, waiter) = completion_channel();
    let session = CaptureSession::new(
        CaptureBuffer::from_lines(lines.iter().copied()),
        Arc::new(LedgerFormatter::default()),
        Box::new(store.clone()),
        CommandTable::default(),
        signal,
    );
    (session, store, waiter)
}

/// Write `text` to `dir/name`, returning the full path.
pub fn write_fixture(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("failed to write fixture file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryStore::default();
        let mut handle = store.clone();
        handle.write("abc").unwrap();
        assert_eq!(store.contents(), "abc");
        assert_eq!(store.writes(), 1);
        store.fail_writes(true);
        assert!(handle.write("x").is_err());
        assert_eq!(store.contents(), "abc");
    }
}
