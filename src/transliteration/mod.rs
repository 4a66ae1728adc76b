//! Malayalam to Manglish transliteration.
//!
//! A context-free, per-character mapping from the Malayalam block to a
//! Latin phonetic rendering. Lookahead is limited to one code point, which
//! is enough to decide whether a consonant keeps its inherent vowel.

mod table;

pub use table::{classify, Glyph, SignKind, INHERENT_VOWEL, VIRAMA};

/// Transliterate Malayalam script into Manglish.
///
/// Characters outside the glyph table (Latin letters, digits, punctuation,
/// whitespace, other scripts) pass through unchanged. The function is total:
/// the empty string maps to the empty string.
pub fn transliterate(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match classify(c) {
            Some(Glyph::Base {
                phonetic,
                consonant,
            }) => {
                result.push_str(phonetic);
                if consonant && !chars.peek().is_some_and(|&next| suppresses_inherent_vowel(next)) {
                    result.push_str(INHERENT_VOWEL);
                }
            }
            Some(Glyph::Dependent { phonetic, .. }) => result.push_str(phonetic),
            None => result.push(c),
        }
    }

    result
}

/// Lowercased transliteration, the form used for search comparisons.
pub fn transliterate_lowercase(text: &str) -> String {
    transliterate(text).to_lowercase()
}

/// Whether a character belongs to the Malayalam Unicode block.
pub fn is_malayalam(c: char) -> bool {
    ('\u{0D00}'..='\u{0D7F}').contains(&c)
}

/// Whether a string contains any Malayalam code point.
pub fn contains_malayalam(text: &str) -> bool {
    text.chars().any(is_malayalam)
}

/// A following matra or virama takes over the consonant's vowel slot.
/// Joiners do not: they carry no vowel of their own.
fn suppresses_inherent_vowel(next: char) -> bool {
    matches!(
        classify(next),
        Some(Glyph::Dependent {
            kind: SignKind::Matra | SignKind::Virama,
            ..
        })
    )
}
