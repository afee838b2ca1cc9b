//! Anchor-based text extraction from raw NutMeg bytes
//!
//! NutMeg headers have no length-prefixed framing, so every field is located
//! by searching for its label in the raw buffer. A label that happens to
//! appear inside binary payload bytes can be misdetected; the format gives
//! no way around that.

use crate::types::{NutError, Result, Variable};
use tracing::trace;

/// Find subsequence in a byte slice
#[inline]
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Find the last occurrence of a subsequence in a byte slice
#[inline]
pub fn rfind_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

/// Offsets of every non-overlapping occurrence of `needle`
pub fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(pos) = find_subsequence(&haystack[from..], needle) {
        found.push(from + pos);
        from += pos + needle.len();
    }
    found
}

#[inline]
fn find_label(raw: &[u8], label: &[u8], reverse: bool) -> Option<usize> {
    if reverse {
        rfind_subsequence(raw, label)
    } else {
        find_subsequence(raw, label)
    }
}

/// Read the value of a `label: value` line.
///
/// Searches for the first (or last, with `reverse`) occurrence of `label`,
/// takes the text up to the next newline and returns whatever follows
/// `"<label>:"`, trimmed. A missing label, a missing colon or a line that is
/// not valid UTF-8 all yield an empty string.
pub fn read_labeled_line(raw: &[u8], label: &str, reverse: bool) -> String {
    let Some(start) = find_label(raw, label.as_bytes(), reverse) else {
        trace!(label, "label not found");
        return String::new();
    };
    let end = raw[start..]
        .iter()
        .position(|&c| c == b'\n')
        .map(|n| start + n)
        .unwrap_or(raw.len());

    let Ok(line) = std::str::from_utf8(&raw[start..end]) else {
        trace!(label, offset = start, "label line is not valid UTF-8");
        return String::new();
    };

    let key = format!("{label}:");
    line.split_once(key.as_str())
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

/// Read a tab separated variable block between two labels.
///
/// `start` is searched last-occurrence first by default (`reverse`), since
/// `"No. Variables:"` also contains `"Variables:"`. The block ends at the
/// next `end` label. Each line is `index \t name \t unit [extra...]`; lines
/// with an empty index are skipped. A missing `start` label yields an empty
/// list.
pub fn read_labeled_block(
    raw: &[u8],
    start: &str,
    end: &str,
    reverse: bool,
) -> Result<Vec<Variable>> {
    let Some(block_start) = find_label(raw, start.as_bytes(), reverse) else {
        trace!(label = start, "block label not found");
        return Ok(Vec::new());
    };
    let block_end = find_subsequence(&raw[block_start..], end.as_bytes())
        .map(|n| block_start + n)
        .ok_or_else(|| {
            NutError::Format(format!(
                "variable block at offset {block_start} not terminated by '{end}'"
            ))
        })?;

    let text = std::str::from_utf8(&raw[block_start..block_end]).map_err(|e| {
        NutError::Format(format!(
            "variable block at offset {block_start} is not valid UTF-8: {e}"
        ))
    })?;
    let body = text.strip_prefix(start).unwrap_or(text);

    let mut variables = Vec::new();
    for line in body.split('\n').map(str::trim) {
        let mut parts = line.split('\t');
        let index = parts.next().unwrap_or_default();
        if index.is_empty() {
            continue;
        }
        let index: usize = index.trim().parse().map_err(|_| {
            NutError::Format(format!("variable block: invalid index in line '{line}'"))
        })?;
        let name = parts
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                NutError::Format(format!("variable block: missing name in line '{line}'"))
            })?;
        let unit = parts
            .next()
            .and_then(|rest| rest.split(' ').next())
            .unwrap_or_default();

        variables.push(Variable::new(name, index, unit));
    }

    Ok(variables)
}
