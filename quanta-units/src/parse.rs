//! Quantity string parsing - split rendered strings like "1.00 km" back apart

/// Split a rendered quantity into its number and unit parts.
///
/// Supported formats:
/// - Spaced: "1.00 km", "2450 N/m"
/// - Attached: "1.5km", "-3e2mm"
///
/// The number part is returned as written; `None` if either part is missing.
pub fn split_str(s: &str) -> Option<(&str, &str)> {
    let s = s.trim();

    if let Some((number, unit)) = s.split_once(char::is_whitespace) {
        let unit = unit.trim();
        if number.is_empty() || unit.is_empty() {
            return None;
        }
        return Some((number, unit));
    }

    let end = number_prefix_len(s);
    if end == 0 || end == s.len() {
        return None;
    }
    Some((&s[..end], &s[end..]))
}

/// Length of the leading `[+-]digits[.digits][e[+-]digits]` run
fn number_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i == digits_start {
        return 0;
    }

    // Exponent only if followed by digits, so "1.5e" keeps "e" as unit text
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}
