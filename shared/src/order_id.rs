//! Order identifier allocation
//!
//! Ids look like `AG007`: one or two year letters (2025 = `A`), a month
//! letter (January = `A` .. December = `L`) and a zero-padded sequence of
//! at least three digits that restarts every month.
//!
//! Allocation is a pure function of the clock and the last issued id. The
//! caller is responsible for serializing calls (the order store does this
//! inside its write transaction).

use chrono::Datelike;

/// First year of the lettering scheme
pub const BASE_YEAR: i32 = 2025;

/// Minimum width of the numeric sequence
pub const SEQUENCE_WIDTH: usize = 3;

/// An order id split into its letter prefix and numeric sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOrderId {
    pub prefix: String,
    pub sequence: u64,
}

fn letter(index: u32) -> char {
    char::from(b'A' + index.min(25) as u8)
}

/// Year letters for `year`; years before the base year clamp to `A`
pub fn year_letters(year: i32) -> String {
    let n = (year - BASE_YEAR).max(0) as u32;
    if n < 26 {
        letter(n).to_string()
    } else {
        let rest = n - 26;
        let mut s = String::with_capacity(2);
        s.push(letter(rest / 26));
        s.push(letter(rest % 26));
        s
    }
}

/// Prefix (year letters + month letter) for the given date
pub fn year_month_prefix(now: &impl Datelike) -> String {
    let mut prefix = year_letters(now.year());
    prefix.push(letter(now.month0()));
    prefix
}

/// Parse `<letters><month letter><digits>`; `None` for anything else
/// (including legacy ids with a single letter)
pub fn parse_order_id(id: &str) -> Option<ParsedOrderId> {
    let id = id.trim();
    let split = id.find(|c: char| !c.is_ascii_uppercase())?;
    let (letters, digits) = id.split_at(split);
    if letters.len() < 2 || digits.len() < SEQUENCE_WIDTH {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sequence = digits.parse::<u64>().ok()?;
    Some(ParsedOrderId {
        prefix: letters.to_string(),
        sequence,
    })
}

/// `prefix` followed by `sequence` padded to at least three digits
pub fn format_order_id(prefix: &str, sequence: u64) -> String {
    format!("{prefix}{sequence:0width$}", width = SEQUENCE_WIDTH)
}

/// Whether `id` has the shape of an allocated order id
pub fn is_valid_order_id(id: &str) -> bool {
    parse_order_id(id).is_some_and(|p| p.sequence > 0)
}

/// Compute the id that follows `last_issued_id` at time `now`.
///
/// Total over its inputs: an empty, malformed or legacy last id restarts
/// the sequence at `001`, as does a last id from another month.
pub fn next_order_id(now: &impl Datelike, last_issued_id: &str) -> String {
    let prefix = year_month_prefix(now);

    match parse_order_id(last_issued_id) {
        Some(parsed) if parsed.prefix == prefix => {
            format_order_id(&prefix, parsed.sequence.saturating_add(1))
        }
        _ => format_order_id(&prefix, 1),
    }
}
