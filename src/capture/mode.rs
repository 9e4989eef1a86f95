//! File association for capture buffers.
//!
//! A path ending in [`CAPTURE_SUFFIX`] is a capture buffer; opening one
//! through [`CaptureMode`] builds the session and runs `setup` on it.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use super::keymap::CommandTable;
use super::session::{CaptureSession, SetupReport};
use super::signal::CompletionSignal;
use super::store::FileStore;
use super::CaptureBuffer;
use crate::error::CaptureError;
use crate::ledger::LedgerService;

/// File-name suffix that marks a capture buffer.
pub const CAPTURE_SUFFIX: &str = ".ledger-cap";

pub fn is_capture_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(CAPTURE_SUFFIX))
}

/// Capabilities shared by every capture session: the ledger service and
/// the command table.
#[derive(Clone)]
pub struct CaptureMode {
    service: Arc<dyn LedgerService>,
    commands: CommandTable,
}

impl CaptureMode {
    pub fn new(service: Arc<dyn LedgerService>, commands: CommandTable) -> Self {
        Self { service, commands }
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn recognizes(&self, path: &Path) -> bool {
        is_capture_path(path)
    }

    /// Open the capture buffer at `path` and prepare it for editing.
    pub fn open(
        &self,
        path: &Path,
        signal: CompletionSignal,
    ) -> Result<(CaptureSession, SetupReport), CaptureError> {
        if !self.recognizes(path) {
            return Err(CaptureError::NotCaptureFile(path.to_path_buf()));
        }
        let store = FileStore::new(path);
        let text = store.read()?;
        Ok(self.start(store, &text, signal))
    }

    /// Like [`open`](Self::open), but a missing file is an error rather than
    /// an empty draft. Used when closing a capture file from outside.
    pub fn open_existing(
        &self,
        path: &Path,
        signal: CompletionSignal,
    ) -> Result<(CaptureSession, SetupReport), CaptureError> {
        if !self.recognizes(path) {
            return Err(CaptureError::NotCaptureFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|e| {
            io::Error::new(e.kind(), format!("{}: {e}", path.display()))
        })?;
        Ok(self.start(FileStore::new(path), &text, signal))
    }

    fn start(
        &self,
        store: FileStore,
        text: &str,
        signal: CompletionSignal,
    ) -> (CaptureSession, SetupReport) {
        let mut session = CaptureSession::new(
            CaptureBuffer::from_text(text),
            Arc::clone(&self.service),
            Box::new(store),
            self.commands.clone(),
            signal,
        );
        let report = session.setup();
        (session, report)
    }
}
