//! Free-text normalization for identity matching.
//!
//! Duplicate detection compares titles and author names after lowercasing,
//! folding common Latin diacritics to their base letter, replacing
//! punctuation with spaces, and collapsing runs of whitespace. The folding
//! table covers Latin-1 and the ligatures that show up in imported catalog
//! data; scripts outside it pass through lowercased but otherwise unchanged.

/// Normalize a free-text field for equality comparison.
///
/// "The Hobbit " and "the hobbit" normalize identically, as do
/// "J.R.R. Tolkien" and "j r r tolkien".
pub fn normalize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars().flat_map(fold_char) {
        let ch = if ch.is_alphanumeric() {
            Some(ch)
        } else {
            // Punctuation and whitespace both separate tokens.
            None
        };
        match ch {
            Some(ch) => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.extend(ch.to_lowercase());
            }
            None => pending_space = true,
        }
    }
    out
}

/// Fold one character to its unaccented equivalent(s).
fn fold_char(ch: char) -> impl Iterator<Item = char> {
    let folded: &'static str = match ch {
        'À'..='Å' | 'à'..='å' | 'Ā' | 'ā' | 'Ă' | 'ă' | 'Ą' | 'ą' => "a",
        'Ç' | 'ç' | 'Ć' | 'ć' | 'Č' | 'č' => "c",
        'Ď' | 'ď' | 'Đ' | 'đ' => "d",
        'È'..='Ë' | 'è'..='ë' | 'Ē' | 'ē' | 'Ė' | 'ė' | 'Ę' | 'ę' | 'Ě' | 'ě' => "e",
        'Ì'..='Ï' | 'ì'..='ï' | 'Ī' | 'ī' | 'Į' | 'į' | 'İ' | 'ı' => "i",
        'Ł' | 'ł' => "l",
        'Ñ' | 'ñ' | 'Ń' | 'ń' | 'Ň' | 'ň' => "n",
        'Ò'..='Ö' | 'ò'..='ö' | 'Ø' | 'ø' | 'Ō' | 'ō' | 'Ő' | 'ő' => "o",
        'Ŕ' | 'ŕ' | 'Ř' | 'ř' => "r",
        'Ś' | 'ś' | 'Š' | 'š' | 'Ş' | 'ş' => "s",
        'Ť' | 'ť' | 'Ţ' | 'ţ' => "t",
        'Ù'..='Ü' | 'ù'..='ü' | 'Ū' | 'ū' | 'Ů' | 'ů' | 'Ű' | 'ű' => "u",
        'Ý' | 'ý' | 'ÿ' => "y",
        'Ź' | 'ź' | 'Ż' | 'ż' | 'Ž' | 'ž' => "z",
        'Æ' | 'æ' => "ae",
        'Œ' | 'œ' => "oe",
        'ß' => "ss",
        'Þ' | 'þ' => "th",
        'Ð' | 'ð' => "d",
        _ => return Fold::Keep(ch),
    };
    Fold::Replace(folded.chars())
}

enum Fold {
    Keep(char),
    Replace(std::str::Chars<'static>),
}

impl Iterator for Fold {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match self {
            Fold::Keep(ch) => {
                let ch = *ch;
                *self = Fold::Replace("".chars());
                Some(ch)
            }
            Fold::Replace(chars) => chars.next(),
        }
    }
}
