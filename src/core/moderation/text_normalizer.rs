// Text normalization for classification input.
//
// Decorative symbols (emoji, pictographs, dingbats, flags) carry no signal for
// the AI detector and skew short messages, so they are dropped before the
// text is case-folded. The result is only ever fed to the classifier.

/// Inclusive code point ranges that are stripped from classifier input.
const EXCLUDED_RANGES: &[(u32, u32)] = &[
    (0x200D, 0x200D),   // Zero-width joiner
    (0x231A, 0x231A),   // Watch
    (0x23CF, 0x23CF),   // Eject
    (0x23E9, 0x23E9),   // Fast forward
    (0x2500, 0x2BFF),   // Box drawing .. misc symbols, dingbats, arrows, stars
    (0x3030, 0x3030),   // Wavy dash
    (0xFE00, 0xFE0F),   // Variation selectors
    (0x1F1E0, 0x1F1FF), // Regional indicator flags
    (0x1F300, 0x1F5FF), // Symbols & pictographs
    (0x1F600, 0x1F64F), // Emoticons
    (0x1F680, 0x1F6FF), // Transport & map symbols
    (0x1F900, 0x1F9FF), // Supplemental symbols & pictographs
    (0x1FA70, 0x1FAFF), // Symbols & pictographs extended-A
];

/// Whether a character belongs to the decorative exclusion set.
pub fn is_decorative(c: char) -> bool {
    let cp = c as u32;
    EXCLUDED_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&cp))
}

/// Strip decorative symbols, trim, and lowercase.
///
/// Never fails; empty or symbol-only input yields an empty string.
pub fn normalize(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !is_decorative(*c)).collect();
    stripped.trim().to_lowercase()
}

/// First code point of each run of ten decimal digits (0-9) outside ASCII.
const DECIMAL_DIGIT_ZEROS: &[u32] = &[
    0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66, 0x0CE6,
    0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946, 0x19D0,
    0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0, 0xA9F0,
    0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0, 0x112F0,
    0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50, 0x11DA0,
    0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140,
    0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// Superscript and subscript digits, which also count as digits.
const SUPER_SUB_DIGITS: &[(u32, u32)] = &[
    (0x00B2, 0x00B3),
    (0x00B9, 0x00B9),
    (0x2070, 0x2070),
    (0x2074, 0x2079),
    (0x2080, 0x2089),
];

/// Whether a character is a digit. Fractions, Roman numerals and other
/// numeric symbols are not.
pub fn is_digit(c: char) -> bool {
    if c.is_ascii_digit() {
        return true;
    }
    let cp = c as u32;
    DECIMAL_DIGIT_ZEROS
        .iter()
        .any(|&zero| (zero..zero + 10).contains(&cp))
        || SUPER_SUB_DIGITS
            .iter()
            .any(|&(start, end)| (start..=end).contains(&cp))
}

/// True when the text is non-empty and every character is a digit.
pub fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_digit)
}
