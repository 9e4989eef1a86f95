//! Column alignment for postings.
//!
//! Accounts are indented to a fixed column and amounts are right-aligned so
//! they end at the amount column. Only whitespace changes; account names,
//! amounts, and posting notes are copied verbatim.

use super::xact::is_header;
use crate::capture::buffer::{is_comment_line, COMMENT_PREFIX};

/// Minimum gap ledger requires between an account and its amount.
const MIN_AMOUNT_GAP: usize = 2;

/// Realign every posting that belongs to a transaction.
pub fn align_postings(
    lines: &[String],
    account_indent: usize,
    amount_column: usize,
) -> Vec<String> {
    let mut in_transaction = false;
    lines
        .iter()
        .map(|line| {
            if is_header(line) {
                in_transaction = true;
                return line.trim_end().to_string();
            }
            if line.trim().is_empty() {
                in_transaction = false;
                return line.clone();
            }
            // Comment lines never end a transaction.
            if is_comment_line(line, COMMENT_PREFIX) {
                return line.clone();
            }
            if !line.starts_with([' ', '\t']) {
                in_transaction = false;
                return line.clone();
            }
            if !in_transaction {
                return line.clone();
            }
            align_posting(line, account_indent, amount_column)
        })
        .collect()
}

/// Pieces of one posting line.
#[derive(Debug, PartialEq, Eq)]
struct Posting<'a> {
    /// `* ` or `! ` per-posting state mark, if any.
    mark: Option<&'a str>,
    account: &'a str,
    amount: &'a str,
    note: Option<&'a str>,
}

fn split_posting(line: &str) -> Posting<'_> {
    let mut body = line.trim();
    let mut mark = None;
    if body.len() >= 2 && (body.starts_with("* ") || body.starts_with("! ")) {
        mark = Some(&body[..2]);
        body = body[2..].trim_start();
    }

    let split_at = [body.find("  "), body.find('\t')]
        .into_iter()
        .flatten()
        .min();
    let (account, rest) = match split_at {
        Some(i) => (&body[..i], body[i..].trim()),
        None => (body, ""),
    };

    let (amount, note) = match rest.find(COMMENT_PREFIX) {
        Some(i) => (rest[..i].trim_end(), Some(&rest[i..])),
        None => (rest, None),
    };
    Posting {
        mark,
        account,
        amount,
        note,
    }
}

fn align_posting(line: &str, account_indent: usize, amount_column: usize) -> String {
    let posting = split_posting(line);
    let mut out = " ".repeat(account_indent);
    if let Some(mark) = posting.mark {
        out.push_str(mark);
    }
    out.push_str(posting.account);

    if !posting.amount.is_empty() {
        let used = out.chars().count() + posting.amount.chars().count();
        let gap = amount_column.saturating_sub(used).max(MIN_AMOUNT_GAP);
        out.push_str(&" ".repeat(gap));
        out.push_str(posting.amount);
    }
    if let Some(note) = posting.note {
        out.push_str(&" ".repeat(MIN_AMOUNT_GAP));
        out.push_str(note);
    }
    out
}
