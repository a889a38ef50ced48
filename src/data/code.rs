// ---------------------------------------------------------------------------
// ISIC code canonicalisation
// ---------------------------------------------------------------------------

/// Reduce a raw ISIC code to its 2-digit top-level grouping.
///
/// Non-digit characters are stripped first. Longer codes are truncated to
/// their first two digits (`"123"` → `"12"`), a single digit is zero-padded
/// (`"5"` → `"05"`), and an input without digits yields `""`.
pub fn normalize_isic(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        0 => String::new(),
        1 => format!("0{digits}"),
        _ => digits[..2].to_string(),
    }
}
