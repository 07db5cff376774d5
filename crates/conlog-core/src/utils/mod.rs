//! String helpers used by the console and by host applications.

pub mod encoding;
pub mod fs;

/// Split `text` on `delimiter`, line-reader style.
///
/// Empty input yields no tokens, a trailing delimiter does not produce a
/// trailing empty token, and empty tokens between delimiters are kept.
pub fn split(text: &str, delimiter: char) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut tokens: Vec<String> = text.split(delimiter).map(String::from).collect();
    if text.ends_with(delimiter) {
        tokens.pop();
    }
    tokens
}

/// Split at the first `delimiter` into at most two parts.
pub fn split_once(text: &str, delimiter: char) -> Vec<String> {
    match text.split_once(delimiter) {
        Some((head, tail)) => vec![head.to_string(), tail.to_string()],
        None => vec![text.to_string()],
    }
}

/// Whitespace tokenizer used for console input. Runs of whitespace count as one separator.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
}

/// Count of decimal digits in `n` (at least 1).
pub fn number_of_digits(mut n: u64) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Parse the first run of ASCII digits in `text`.
///
/// With `only_at_start`, the digits must begin at index 0. `None` when no
/// digits are found or the value does not fit an `i32`.
pub fn extract_digits(text: &str, only_at_start: bool) -> Option<i32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    if only_at_start && start != 0 {
        return None;
    }
    let digits: &str = {
        let rest = &text[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    digits.parse().ok()
}

/// Human-readable byte count with two decimals, e.g. `1.50 KB`.
pub fn friendly_bytes(bytes: u64) -> String {
    const SUFFIXES: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    let mut value = bytes as f64;
    let mut index = 0;
    while value >= 1024.0 && index < SUFFIXES.len() - 1 {
        value /= 1024.0;
        index += 1;
    }
    format!("{:.2} {}", value, SUFFIXES[index])
}
