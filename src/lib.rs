//! ledgercap: review ledger transactions in an editor before they reach the
//! journal.
//!
//! A capture file (`*.ledger-cap`) holds a draft entry. Opening it through
//! [`capture::CaptureMode`] focuses the first uncleared transaction and
//! strips `???` placeholders; the human edits it and ends the session with
//! one terminal command. Finalizing realigns postings, toggles the cleared
//! mark and drops comment lines; aborting empties the file. Either way the
//! file is saved before the completion signal releases the waiting caller.
//!
//! # Quick start
//!
//! ```no_run
//! use ledgercap::capture::completion_channel;
//! use ledgercap::config::load_config;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?;
//! let mode = config.capture_mode()?;
//! let (signal, waiter) = completion_channel();
//! let (mut session, _report) = mode.open(Path::new("entry.ledger-cap"), signal)?;
//! session.finalize()?;
//! waiter.wait_blocking()?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod import;
pub mod ledger;
pub mod render;
#[cfg(test)]
pub mod testsupport;
