//! Capture-session lifecycle.
//!
//! A capture buffer is opened (`setup` normalizes it), edited by a human,
//! and then ended by exactly one terminal transition:
//!
//! ```text
//! pending --finalize()--> committed
//! pending --abort()-----> aborted
//! committed / aborted --(any terminal op)--> ProtocolViolation
//! ```
//!
//! Leaving `pending` persists the buffer and then fires the completion
//! signal, which releases whoever is blocked on the session.

pub mod buffer;
pub mod interactive;
pub mod keymap;
pub mod mode;
pub mod session;
pub mod signal;
pub mod store;

pub use buffer::{CaptureBuffer, Position, COMMENT_PREFIX, PLACEHOLDER_MARKER};
pub use interactive::{
    edit_capture_file, run_interactive, EditorCommand, KeySource, LineKeys, TerminalKeys,
};
pub use keymap::{CaptureCommand, CommandTable, KeyResolution, KeySequence};
pub use mode::{is_capture_path, CaptureMode, CAPTURE_SUFFIX};
pub use session::{CaptureSession, Outcome, SetupReport};
pub use signal::{completion_channel, CompletionSignal, CompletionWaiter};
pub use store::{CaptureStore, FileStore};
