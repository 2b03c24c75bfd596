//! Canonicalization of free-text names, emails, and addresses so records
//! from unrelated sources can be compared.

use regex::Regex;
use std::sync::LazyLock;

/// UK postcode shape: 1–2 letters, 1–2 digits, optional letter, optional
/// space, digit, two letters (SW1A 1AA, E1 6AN, EC1A1BB, ...).
static RE_POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]{1,2}\d{1,2}[A-Z]?\s?\d[A-Z]{2})").unwrap());

/// Fragments that mark a "name" as leaked error/stack-trace text rather
/// than a person. Checked case-insensitively as substrings.
const GARBAGE_FRAGMENTS: &[&str] = &[
    "file \"",
    "traceback",
    "stack trace",
    "\", line",
    "raise ",
    "exception:",
    "def __init__",
    "super()",
    "self.",
    "^^^^^",
    "~~~~~",
];

/// Trim a display name and drop a parenthesized area-code suffix:
/// `"John Smith (NW10)"` → `"John Smith"`. Case is preserved; callers
/// comparing names must fold case themselves.
pub fn normalize_name(raw: &str) -> String {
    match raw.split_once('(') {
        Some((before, _)) => before.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Trim and lower-case an email. Whitespace-only input normalizes to the
/// empty string, which must never be treated as a valid match key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Scan free text for a UK postcode-shaped token. When the match carries
/// no internal space, one is inserted three characters from the end
/// (`"SW1A1AA"` → `"SW1A 1AA"`).
pub fn extract_postcode(address: &str) -> Option<String> {
    let upper = address.to_uppercase();
    let m = RE_POSTCODE.find(&upper)?;
    let postcode = m.as_str().trim().to_string();
    if !postcode.contains(' ') && postcode.len() > 3 {
        let split = postcode.len() - 3;
        return Some(format!("{} {}", &postcode[..split], &postcode[split..]));
    }
    Some(postcode)
}

/// Lenient plausibility check for a human name. Rejects only obvious
/// garbage: too short, leaked error text, mostly symbols, or no letters
/// at all. False negatives for garbage are tolerated; rejecting a real
/// name is not.
pub fn is_plausible_human_name(raw: &str) -> bool {
    let name = raw.trim();
    if name.len() < 2 {
        return false;
    }

    let lower = name.to_lowercase();
    if GARBAGE_FRAGMENTS.iter().any(|frag| lower.contains(frag)) {
        return false;
    }

    // Mostly-symbol strings are not names.
    let plain = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .count();
    if (plain as f64) / (name.chars().count() as f64) < 0.3 {
        return false;
    }

    name.chars().any(|c| c.is_alphabetic())
}
