// Keycap emoji helpers for number pickers.
//
// 0-9 are the ASCII digit followed by VS16 and the combining enclosing
// keycap. 10 has its own code point.

use thiserror::Error;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const COMBINING_ENCLOSING_KEYCAP: char = '\u{20E3}';
const KEYCAP_TEN: &str = "\u{1F51F}";

/// Highest number with a keycap glyph.
pub const MAX_KEYCAP: u8 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeycapError {
    #[error("no keycap emoji exists for {0} (only 0 through 10)")]
    OutOfRange(i64),

    #[error("{0:?} is not a keycap emoji")]
    NotAKeycap(String),
}

/// Keycap glyph for `number`.
pub fn encode(number: i64) -> Result<String, KeycapError> {
    match number {
        10 => Ok(KEYCAP_TEN.to_string()),
        0..=9 => {
            let digit = char::from(b'0' + number as u8);
            Ok(format!(
                "{}{}{}",
                digit, VARIATION_SELECTOR_16, COMBINING_ENCLOSING_KEYCAP
            ))
        }
        _ => Err(KeycapError::OutOfRange(number)),
    }
}

/// Reads a keycap glyph back into its number.
pub fn decode(glyph: &str) -> Result<u8, KeycapError> {
    if glyph == KEYCAP_TEN {
        return Ok(10);
    }

    let mut chars = glyph.chars();
    let digit = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| KeycapError::NotAKeycap(glyph.to_string()))?;

    // Some clients drop the variation selector.
    let rest: String = chars.collect();
    let expected_full = format!("{}{}", VARIATION_SELECTOR_16, COMBINING_ENCLOSING_KEYCAP);
    if rest == expected_full || rest == COMBINING_ENCLOSING_KEYCAP.to_string() {
        Ok(digit as u8)
    } else {
        Err(KeycapError::NotAKeycap(glyph.to_string()))
    }
}

/// Keycaps for `1..=count`, capped at ten. Used to label list entries.
pub fn numbered(count: usize) -> Vec<String> {
    (1..=count.min(MAX_KEYCAP as usize))
        .filter_map(|n| encode(n as i64).ok())
        .collect()
}
