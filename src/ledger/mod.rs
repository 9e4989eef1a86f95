//! Structured-text service for ledger entries.
//!
//! Capture sessions consume ledger syntax only through [`LedgerService`], so
//! alternative formatters can be injected without touching the lifecycle.
//! [`LedgerFormatter`] is the built-in implementation.

pub mod format;
pub mod xact;

use std::fmt;

use crate::capture::buffer::{CaptureBuffer, Position};

/// Default indentation of posting accounts.
pub const DEFAULT_ACCOUNT_INDENT: usize = 4;
/// Default column at which posting amounts end.
pub const DEFAULT_AMOUNT_COLUMN: usize = 52;

/// Reconciliation state of a transaction header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearState {
    Uncleared,
    /// `!`: flagged, not yet reconciled.
    Pending,
    /// `*`: reconciled against an external record.
    Cleared,
}

impl ClearState {
    /// Header mark for this state, if any.
    pub fn mark(self) -> Option<char> {
        match self {
            Self::Uncleared => None,
            Self::Pending => Some('!'),
            Self::Cleared => Some('*'),
        }
    }

    /// State after one toggle: cleared becomes uncleared, anything else cleared.
    pub fn toggled(self) -> Self {
        match self {
            Self::Cleared => Self::Uncleared,
            Self::Uncleared | Self::Pending => Self::Cleared,
        }
    }
}

impl fmt::Display for ClearState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uncleared => "uncleared",
            Self::Pending => "pending",
            Self::Cleared => "cleared",
        })
    }
}

/// Ledger-syntax operations a capture session delegates.
pub trait LedgerService: Send + Sync {
    /// Position of the first transaction at or after `from` that is not
    /// cleared. `None` when every transaction is cleared or none exist.
    fn find_next_uncleared(&self, buffer: &CaptureBuffer, from: Position) -> Option<Position>;

    /// Column-only reformat. Must not change any value.
    fn format_alignment(&self, lines: &[String]) -> Vec<String>;

    /// Flip the cleared state of the transaction at `at`, returning the new
    /// state, or `None` when there is no transaction to flip.
    fn toggle_cleared(&self, buffer: &mut CaptureBuffer, at: Position) -> Option<ClearState>;

    /// Current state of the transaction at `at`.
    fn clear_state(&self, buffer: &CaptureBuffer, at: Position) -> Option<ClearState>;
}

/// Built-in ledger service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerFormatter {
    pub account_indent: usize,
    pub amount_column: usize,
}

impl Default for LedgerFormatter {
    fn default() -> Self {
        Self {
            account_indent: DEFAULT_ACCOUNT_INDENT,
            amount_column: DEFAULT_AMOUNT_COLUMN,
        }
    }
}

impl LedgerService for LedgerFormatter {
    fn find_next_uncleared(&self, buffer: &CaptureBuffer, from: Position) -> Option<Position> {
        xact::next_uncleared(buffer.lines(), from.line).map(|line| Position::new(line, 0))
    }

    fn format_alignment(&self, lines: &[String]) -> Vec<String> {
        format::align_postings(lines, self.account_indent, self.amount_column)
    }

    fn toggle_cleared(&self, buffer: &mut CaptureBuffer, at: Position) -> Option<ClearState> {
        let index = xact::owning_header(buffer.lines(), at.line)?;
        let line = buffer.line_mut(index)?;
        let header = xact::parse_header(line)?;
        let next = header.state.toggled();
        let updated = xact::with_state(&header, next);
        *line = updated;
        Some(next)
    }

    fn clear_state(&self, buffer: &CaptureBuffer, at: Position) -> Option<ClearState> {
        let index = xact::owning_header(buffer.lines(), at.line)?;
        xact::parse_header(buffer.line(index)?).map(|header| header.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(raw: &[&str]) -> CaptureBuffer {
        CaptureBuffer::from_lines(raw.iter().copied())
    }

    #[test]
    fn toggle_flips_only_the_transaction_at_the_cursor() {
        let service = LedgerFormatter::default();
        let mut buf = buffer(&[
            "2021/01/01 A",
            "    Assets:Cash  1",
            "",
            "2021/01/02 B",
            "    Assets:Cash  2",
        ]);
        let state = service.toggle_cleared(&mut buf, Position::new(4, 0));
        assert_eq!(state, Some(ClearState::Cleared));
        assert_eq!(buf.line(0), Some("2021/01/01 A"));
        assert_eq!(buf.line(3), Some("2021/01/02 * B"));

        let state = service.toggle_cleared(&mut buf, Position::new(3, 0));
        assert_eq!(state, Some(ClearState::Uncleared));
        assert_eq!(buf.line(3), Some("2021/01/02 B"));
    }

    #[test]
    fn pending_toggles_to_cleared() {
        let service = LedgerFormatter::default();
        let mut buf = buffer(&["2021/01/01 ! A"]);
        assert_eq!(
            service.clear_state(&buf, Position::START),
            Some(ClearState::Pending)
        );
        service.toggle_cleared(&mut buf, Position::START);
        assert_eq!(buf.line(0), Some("2021/01/01 * A"));
    }

    #[test]
    fn toggle_without_transaction_is_a_no_op() {
        let service = LedgerFormatter::default();
        let mut buf = buffer(&["; only a note"]);
        assert_eq!(service.toggle_cleared(&mut buf, Position::START), None);
        assert_eq!(buf.line(0), Some("; only a note"));
    }

    #[test]
    fn find_next_uncleared_reports_header_line() {
        let service = LedgerFormatter::default();
        let buf = buffer(&["; info", "2021/01/01 * A", "2021/01/02 B"]);
        assert_eq!(
            service.find_next_uncleared(&buf, Position::START),
            Some(Position::new(2, 0))
        );
    }
}
