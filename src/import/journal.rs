//! Appending captured entries to the ledger journal.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Append `entry` to the journal at `path`, separated from existing content
/// by one blank line. Blank entries (aborted captures) append nothing.
/// Returns whether anything was written.
pub fn append_to_ledger(path: &Path, entry: &str) -> io::Result<bool> {
    let entry = entry.trim_end();
    if entry.trim().is_empty() {
        return Ok(false);
    }
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };
    let separator = if existing.trim().is_empty() || existing.ends_with("\n\n") {
        ""
    } else if existing.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{separator}{entry}")?;
    file.sync_all()?;
    Ok(true)
}
