//! Glyph mapping table for the Malayalam block.

/// Vowel appended to a consonant that is not followed by a matra or virama.
pub const INHERENT_VOWEL: &str = "a";

/// The vowel-killer sign.
pub const VIRAMA: char = '\u{0D4D}';

const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';

/// Kinds of dependent signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignKind {
    /// Dependent vowel sign.
    Matra,
    /// Vowel killer.
    Virama,
    /// Zero-width joiner or non-joiner.
    Joiner,
}

/// Classification of a mapped code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Independent vowel, consonant, chillu, anusvara or visarga.
    Base {
        phonetic: &'static str,
        consonant: bool,
    },
    /// Matra, virama or joiner; never carries an inherent vowel.
    Dependent {
        phonetic: &'static str,
        kind: SignKind,
    },
}

/// Look up a code point in the glyph table.
pub fn classify(c: char) -> Option<Glyph> {
    if let Some(phonetic) = consonant(c) {
        return Some(Glyph::Base {
            phonetic,
            consonant: true,
        });
    }
    if let Some(phonetic) = other_base(c) {
        return Some(Glyph::Base {
            phonetic,
            consonant: false,
        });
    }
    dependent(c).map(|(phonetic, kind)| Glyph::Dependent { phonetic, kind })
}

fn consonant(c: char) -> Option<&'static str> {
    let phonetic = match c {
        'ക' => "k", 'ഖ' => "kh", 'ഗ' => "g", 'ഘ' => "gh", 'ങ' => "ng",
        'ച' => "ch", 'ഛ' => "chh", 'ജ' => "j", 'ഝ' => "jh", 'ഞ' => "nj",
        'ട' => "t", 'ഠ' => "th", 'ഡ' => "d", 'ഢ' => "dh", 'ണ' => "n",
        'ത' => "th", 'ഥ' => "th", 'ദ' => "d", 'ധ' => "dh", 'ന' => "n",
        'പ' => "p", 'ഫ' => "f", 'ബ' => "b", 'ഭ' => "bh", 'മ' => "m",
        'യ' => "y", 'ര' => "r", 'ല' => "l", 'വ' => "v",
        'ശ' => "sh", 'ഷ' => "sh", 'സ' => "s", 'ഹ' => "h",
        'ള' => "l", 'ഴ' => "zh", 'റ' => "r",
        _ => return None,
    };
    Some(phonetic)
}

fn other_base(c: char) -> Option<&'static str> {
    let phonetic = match c {
        // Independent vowels
        'അ' => "a", 'ആ' => "aa", 'ഇ' => "i", 'ഈ' => "ee", 'ഉ' => "u", 'ഊ' => "oo",
        'ഋ' => "ru", 'എ' => "e", 'ഏ' => "e", 'ഐ' => "ai", 'ഒ' => "o", 'ഓ' => "o",
        'ഔ' => "au",
        // Chillus
        'ൺ' => "n", 'ൻ' => "n", 'ർ' => "r", 'ൽ' => "l", 'ൾ' => "l", 'ൿ' => "k",
        // Anusvara, visarga
        'ം' => "m", 'ഃ' => "h",
        _ => return None,
    };
    Some(phonetic)
}

fn dependent(c: char) -> Option<(&'static str, SignKind)> {
    let entry = match c {
        'ാ' => ("a", SignKind::Matra),
        'ി' => ("i", SignKind::Matra),
        'ീ' => ("ee", SignKind::Matra),
        'ു' => ("u", SignKind::Matra),
        'ൂ' => ("oo", SignKind::Matra),
        'ൃ' => ("ru", SignKind::Matra),
        'െ' => ("e", SignKind::Matra),
        'േ' => ("e", SignKind::Matra),
        'ൈ' => ("ai", SignKind::Matra),
        'ൊ' => ("o", SignKind::Matra),
        'ോ' => ("o", SignKind::Matra),
        'ൗ' => ("au", SignKind::Matra),
        VIRAMA => ("", SignKind::Virama),
        ZWNJ | ZWJ => ("", SignKind::Joiner),
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consonant_range_is_classified() {
        for c in ['ക', 'ഹ', 'ള', 'ഴ', 'റ'] {
            assert!(
                matches!(classify(c), Some(Glyph::Base { consonant: true, .. })),
                "{c} should be a consonant"
            );
        }
    }

    #[test]
    fn test_chillu_is_not_a_consonant() {
        assert_eq!(
            classify('ൻ'),
            Some(Glyph::Base {
                phonetic: "n",
                consonant: false
            })
        );
    }

    #[test]
    fn test_virama_entry() {
        assert_eq!(
            classify(VIRAMA),
            Some(Glyph::Dependent {
                phonetic: "",
                kind: SignKind::Virama
            })
        );
    }

    #[test]
    fn test_unmapped() {
        assert_eq!(classify('a'), None);
        assert_eq!(classify('൧'), None);
    }
}
