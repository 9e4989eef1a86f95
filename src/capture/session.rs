//! The capture session: one buffer, one terminal transition, one signal.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::buffer::{CaptureBuffer, Position, COMMENT_PREFIX, PLACEHOLDER_MARKER};
use super::keymap::{CaptureCommand, CommandTable, KeyResolution, KeySequence};
use super::signal::CompletionSignal;
use super::store::CaptureStore;
use crate::error::CaptureError;
use crate::ledger::{ClearState, LedgerService};

/// Lifecycle state of a session. Leaves `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Committed,
    Aborted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        })
    }
}

/// What `setup` did to a freshly opened buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Header of the first uncleared transaction, if one was found.
    pub focus: Option<Position>,
    pub placeholders_removed: usize,
}

/// A live editing session over one capture buffer.
pub struct CaptureSession {
    buffer: CaptureBuffer,
    outcome: Outcome,
    service: Arc<dyn LedgerService>,
    store: Box<dyn CaptureStore>,
    commands: CommandTable,
    signal: Option<CompletionSignal>,
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("location", &self.store.location())
            .field("outcome", &self.outcome)
            .field("lines", &self.buffer.len())
            .finish()
    }
}

impl CaptureSession {
    pub fn new(
        buffer: CaptureBuffer,
        service: Arc<dyn LedgerService>,
        store: Box<dyn CaptureStore>,
        commands: CommandTable,
        signal: CompletionSignal,
    ) -> Self {
        Self {
            buffer,
            outcome: Outcome::Pending,
            service,
            store,
            commands,
            signal: Some(signal),
        }
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn location(&self) -> &Path {
        self.store.location()
    }

    /// Cleared state of the transaction under the cursor.
    pub fn clear_state(&self) -> Option<ClearState> {
        self.service.clear_state(&self.buffer, self.buffer.cursor())
    }

    pub fn set_cursor(&mut self, position: Position) {
        self.buffer.set_cursor(position);
    }

    /// Normalize a freshly opened buffer: focus the first uncleared
    /// transaction and strip every placeholder marker.
    ///
    /// Not finding an uncleared transaction is fine; the cursor stays at the
    /// start of the buffer. Nothing is persisted.
    pub fn setup(&mut self) -> SetupReport {
        if self.outcome != Outcome::Pending {
            return SetupReport::default();
        }
        let focus = self
            .service
            .find_next_uncleared(&self.buffer, Position::START);
        self.buffer.set_cursor(focus.unwrap_or(Position::START));
        let placeholders_removed = self.buffer.remove_marker(PLACEHOLDER_MARKER);
        info!(
            location = %self.location().display(),
            focus_line = focus.map(|p| p.line),
            placeholders_removed,
            "capture buffer prepared"
        );
        SetupReport {
            focus,
            placeholders_removed,
        }
    }

    /// Load the human's edits into the buffer.
    pub fn replace_text(&mut self, text: &str) -> Result<(), CaptureError> {
        self.ensure_pending("replace_text")?;
        let edited = CaptureBuffer::from_text(text);
        self.buffer.replace_lines(edited.lines().to_vec());
        Ok(())
    }

    /// Commit the entry: align, mark cleared, drop comments, persist, signal.
    ///
    /// The transforms run on a copy that only replaces the buffer once the
    /// write succeeded, so a failed save can be retried without toggling the
    /// cleared mark twice.
    pub fn finalize(&mut self) -> Result<(), CaptureError> {
        self.ensure_pending("finalize")?;

        let mut work = self.buffer.clone();
        let aligned = self.service.format_alignment(work.lines());
        work.replace_lines(aligned);

        let at = work.cursor();
        let cleared = self.service.toggle_cleared(&mut work, at);
        if cleared.is_none() {
            warn!(
                location = %self.location().display(),
                "no transaction under the cursor; cleared state left alone"
            );
        }

        work.move_to_start();
        let comments = work.strip_comment_lines(COMMENT_PREFIX);
        debug!(comments, ?cleared, "entry transformed for commit");

        self.persist_and_release(work, Outcome::Committed)
    }

    /// Discard the entry: empty the buffer, persist it, signal.
    pub fn abort(&mut self) -> Result<(), CaptureError> {
        self.ensure_pending("abort")?;
        let mut work = self.buffer.clone();
        work.clear();
        self.persist_and_release(work, Outcome::Aborted)
    }

    pub fn run_command(&mut self, command: CaptureCommand) -> Result<(), CaptureError> {
        match command {
            CaptureCommand::Finalize => self.finalize(),
            CaptureCommand::Abort => self.abort(),
            CaptureCommand::Edit => self.ensure_pending("edit"),
        }
    }

    /// Look up `keys` in this session's command table and run the bound
    /// terminal command, if any.
    pub fn dispatch(&mut self, keys: &KeySequence) -> Result<KeyResolution, CaptureError> {
        let resolution = self.commands.resolve(keys);
        debug!(keys = %keys, ?resolution, "key dispatch");
        if let KeyResolution::Command(command) = resolution {
            self.run_command(command)?;
        }
        Ok(resolution)
    }

    fn ensure_pending(&self, operation: &'static str) -> Result<(), CaptureError> {
        if self.outcome == Outcome::Pending {
            Ok(())
        } else {
            Err(CaptureError::ProtocolViolation {
                operation,
                outcome: self.outcome,
            })
        }
    }

    fn persist_and_release(
        &mut self,
        work: CaptureBuffer,
        outcome: Outcome,
    ) -> Result<(), CaptureError> {
        if let Err(source) = self.store.write(&work.to_text()) {
            warn!(
                location = %self.location().display(),
                error = %source,
                "capture buffer not persisted; session stays pending"
            );
            return Err(CaptureError::PersistenceFailure {
                location: self.location().to_path_buf(),
                source,
            });
        }

        self.buffer = work;
        self.outcome = outcome;
        if let Some(signal) = self.signal.take() {
            if !signal.notify() {
                debug!("completion waiter already gone");
            }
        }
        info!(location = %self.location().display(), %outcome, "capture session ended");
        Ok(())
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.outcome == Outcome::Pending {
            warn!(
                location = %self.location().display(),
                "capture session dropped while pending; waiter will see it abandoned"
            );
        }
    }
}
