//! Transaction header parsing and cleared-state edits.
//!
//! Only the parts of a header needed for reconciliation are understood:
//! `DATE[=AUX] [*|!] [(CODE)] PAYEE`. Everything after the state mark is kept
//! verbatim.

use super::ClearState;

/// Parsed view of a transaction header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    /// Date token, including an optional `=AUX` date.
    pub date: &'a str,
    pub state: ClearState,
    /// Remainder after the state mark (code and payee), trimmed at the front.
    pub rest: &'a str,
}

/// True when `line` opens a dated transaction.
pub fn is_header(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

pub fn parse_header(line: &str) -> Option<Header<'_>> {
    if !is_header(line) {
        return None;
    }
    let date_end = line.find(char::is_whitespace).unwrap_or(line.len());
    let date = &line[..date_end];
    let after_date = line[date_end..].trim_start();

    let (state, rest) = match after_date.chars().next() {
        Some(mark @ ('*' | '!')) if mark_stands_alone(after_date) => {
            let state = if mark == '*' {
                ClearState::Cleared
            } else {
                ClearState::Pending
            };
            (state, after_date[1..].trim_start())
        }
        _ => (ClearState::Uncleared, after_date),
    };
    Some(Header { date, state, rest })
}

// `*Payee` is a payee that starts with a star, not a cleared mark.
fn mark_stands_alone(after_date: &str) -> bool {
    after_date[1..]
        .chars()
        .next()
        .map_or(true, char::is_whitespace)
}

/// Rebuild a header line with the given state, keeping date and payee text.
pub fn with_state(header: &Header<'_>, state: ClearState) -> String {
    let mut out = String::from(header.date);
    if let Some(mark) = state.mark() {
        out.push(' ');
        out.push(mark);
    }
    if !header.rest.is_empty() {
        out.push(' ');
        out.push_str(header.rest);
    }
    out
}

/// Index of the header owning line `at`: the nearest header at or above it,
/// otherwise the first header below it.
pub fn owning_header(lines: &[String], at: usize) -> Option<usize> {
    let at = at.min(lines.len().checked_sub(1)?);
    (0..=at)
        .rev()
        .find(|&i| is_header(&lines[i]))
        .or_else(|| (at + 1..lines.len()).find(|&i| is_header(&lines[i])))
}

/// First header at or after line `from` that is not cleared.
pub fn next_uncleared(lines: &[String], from: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| {
            parse_header(line).is_some_and(|header| header.state != ClearState::Cleared)
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_state_marks() {
        let h = parse_header("2021/01/01 * (42) Store").unwrap();
        assert_eq!(h.date, "2021/01/01");
        assert_eq!(h.state, ClearState::Cleared);
        assert_eq!(h.rest, "(42) Store");

        let h = parse_header("2021/01/01=2021/01/03 ! Store").unwrap();
        assert_eq!(h.date, "2021/01/01=2021/01/03");
        assert_eq!(h.state, ClearState::Pending);

        let h = parse_header("2021/01/01 *Starbucks").unwrap();
        assert_eq!(h.state, ClearState::Uncleared);
        assert_eq!(h.rest, "*Starbucks");

        assert!(parse_header("    Expenses:Food  10.00").is_none());
        assert!(parse_header("; 2021/01/01").is_none());
    }

    #[test]
    fn with_state_keeps_payee_verbatim() {
        let h = parse_header("2021/01/01   Store  & Co").unwrap();
        assert_eq!(with_state(&h, ClearState::Cleared), "2021/01/01 * Store  & Co");
        let h = parse_header("2021/01/01 * Store").unwrap();
        assert_eq!(with_state(&h, ClearState::Uncleared), "2021/01/01 Store");
        let h = parse_header("2021/01/01").unwrap();
        assert_eq!(with_state(&h, ClearState::Cleared), "2021/01/01 *");
    }

    #[test]
    fn owning_header_prefers_enclosing_transaction() {
        let buf = lines(&[
            "; info",
            "2021/01/01 A",
            "    Assets:Cash  1",
            "",
            "2021/01/02 B",
            "    Assets:Cash  2",
        ]);
        assert_eq!(owning_header(&buf, 0), Some(1));
        assert_eq!(owning_header(&buf, 2), Some(1));
        assert_eq!(owning_header(&buf, 5), Some(4));
        assert_eq!(owning_header(&[], 0), None);
    }

    #[test]
    fn next_uncleared_skips_cleared_headers() {
        let buf = lines(&["2021/01/01 * A", "2021/01/02 ! B", "2021/01/03 C"]);
        assert_eq!(next_uncleared(&buf, 0), Some(1));
        assert_eq!(next_uncleared(&buf, 2), Some(2));
        assert_eq!(next_uncleared(&lines(&["2021/01/01 * A"]), 0), None);
    }
}
