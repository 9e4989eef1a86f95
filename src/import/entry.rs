//! Ledger entry text built from a transfer and its booking.

use super::rules::{Booking, CreditSide, Matched};
use super::statement::Transfer;

const INFO_RULE_WIDTH: usize = 60;
const AMBIGUOUS_NOTICE: &str = ";\n; Multiple matches. Pick one\n";

/// Comment block describing the raw transfer; removed again when the capture
/// is finalized.
pub fn info_block(transfer: &Transfer) -> String {
    let mut out = format!(
        "; {}={}: {} --> {}\n",
        transfer.book_date, transfer.val_date, transfer.debitor, transfer.creditor
    );
    for line in &transfer.subject {
        out.push_str("; ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("; ");
    out.push_str(&"#".repeat(INFO_RULE_WIDTH));
    out.push('\n');
    out
}

/// One transaction: header, creditor postings, balancing debitor posting.
/// No trailing newline.
pub fn transaction(transfer: &Transfer, booking: &Booking, indent: usize) -> String {
    let ind = " ".repeat(indent);
    let currency = &transfer.currency;
    let mut out = if transfer.book_date == transfer.val_date {
        format!("{} {}\n", transfer.book_date, booking.title)
    } else {
        format!(
            "{}={} {}\n",
            transfer.book_date, transfer.val_date, booking.title
        )
    };
    match &booking.creditor {
        CreditSide::Account(account) => {
            out.push_str(&format!("{ind}{account}{ind}{currency} {}\n", transfer.amount));
        }
        CreditSide::Splits(splits) => {
            for split in splits {
                out.push_str(&format!("{ind}{}{ind}{currency} {}\n", split.0, split.1));
            }
        }
    }
    out.push_str(&format!(
        "{ind}{}{ind}{currency} {}",
        booking.debitor_acc,
        negate(&transfer.amount)
    ));
    out
}

/// Full capture text for one transfer.
pub fn build_entry(transfer: &Transfer, matched: &Matched, indent: usize) -> String {
    let mut out = info_block(transfer);
    match matched {
        Matched::Single(booking) => out.push_str(&transaction(transfer, booking, indent)),
        Matched::Ambiguous(bookings) => {
            out.push_str(AMBIGUOUS_NOTICE);
            for booking in bookings {
                out.push_str(&transaction(transfer, booking, indent));
                out.push('\n');
            }
        }
    }
    out
}

/// Sign-flip a textual amount.
pub fn negate(amount: &str) -> String {
    match amount.strip_prefix('-') {
        Some(positive) => positive.to_string(),
        None => format!("-{amount}"),
    }
}
