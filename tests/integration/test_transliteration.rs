//! Transliteration properties over whole character ranges.

use myvote::transliteration::{classify, transliterate, Glyph, VIRAMA};

fn consonants() -> Vec<(char, &'static str)> {
    ('\u{0D00}'..='\u{0D7F}')
        .filter_map(|c| match classify(c) {
            Some(Glyph::Base {
                phonetic,
                consonant: true,
            }) => Some((c, phonetic)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_ascii_is_unchanged() {
    for input in ["", "Suresh", "KL/01/123", "booth 7, ward 3!", "  tabs\tand\nlines  "] {
        assert_eq!(transliterate(input), input);
    }
}

#[test]
fn test_total_over_the_block() {
    for c in '\u{0D00}'..='\u{0D7F}' {
        let input: String = [c, c, VIRAMA, c].iter().collect();
        let _ = transliterate(&input);
    }
    let _ = transliterate("\u{0D4D}\u{0D4D}\u{200D}");
}

#[test]
fn test_consonant_coverage() {
    let found: Vec<char> = consonants().into_iter().map(|(c, _)| c).collect();
    assert_eq!(found.len(), 36);
    assert!(found.contains(&'ള'));
    assert!(found.contains(&'ഴ'));
    assert!(found.contains(&'റ'));
}

#[test]
fn test_virama_suppresses_inherent_vowel_for_every_consonant() {
    for (c, phonetic) in consonants() {
        let input: String = [c, VIRAMA].iter().collect();
        assert_eq!(transliterate(&input), phonetic, "consonant {:?}", c);
    }
}

#[test]
fn test_bare_consonant_gets_inherent_vowel() {
    for (c, phonetic) in consonants() {
        assert_eq!(transliterate(&c.to_string()), format!("{}a", phonetic), "consonant {:?}", c);
    }
}

#[test]
fn test_worked_examples() {
    assert_eq!(transliterate("രാം"), "ram");
    assert_eq!(transliterate("സുരേഷ്"), "suresh");
    assert_eq!(transliterate("കി"), "ki");
    assert_eq!(transliterate("ക്"), "k");
}

#[test]
fn test_mixed_scripts() {
    assert_eq!(transliterate("Booth 3 - ഗോകുൽ"), "Booth 3 - gokul");
}
