//! Keyword lookup.
//!
//! Keywords are resolved through a perfect hash table that is built at compile time. Building
//! the table panics on any collision, so adding a keyword (or an alternate spelling) that
//! collides fails the build instead of silently shadowing another keyword.

use crate::token::Token;

/// Number of slots in the keyword table. Must be a power of two.
pub const KEYWORD_TABLE_SIZE: usize = 64;

/// Every reserved word and the token it scans as.
pub const KEYWORDS: &[(&str, Token)] = &[
    ("break", Token::Break),
    ("case", Token::Case),
    ("chan", Token::Chan),
    ("const", Token::Const),
    ("continue", Token::Continue),
    ("default", Token::Default),
    ("defer", Token::Defer),
    ("else", Token::Else),
    ("enum", Token::Enum),
    ("fallthrough", Token::Fallthrough),
    ("for", Token::For),
    ("func", Token::Func),
    ("go", Token::Go),
    ("goto", Token::Goto),
    ("if", Token::If),
    ("import", Token::Import),
    ("interface", Token::Interface),
    ("map", Token::Map),
    ("package", Token::Package),
    ("range", Token::Range),
    ("return", Token::Return),
    ("select", Token::Select),
    ("struct", Token::Struct),
    ("switch", Token::Switch),
    ("type", Token::Type),
    ("var", Token::Var),
];

/// Alternate spellings of keywords.
pub const ALTERNATE_SPELLINGS: &[(&str, Token)] = &[("fn", Token::Func)];

static KEYWORD_TABLE: [Option<(&str, Token)>; KEYWORD_TABLE_SIZE] = build_keyword_table();

/// Hashes a candidate keyword. `s` must be at least two bytes long.
pub const fn keyword_hash(s: &[u8]) -> usize {
    ((((s[0] as usize) << 4) ^ s[1] as usize) + s.len()) & (KEYWORD_TABLE_SIZE - 1)
}

const fn build_keyword_table() -> [Option<(&'static str, Token)>; KEYWORD_TABLE_SIZE] {
    let mut table = [None; KEYWORD_TABLE_SIZE];
    table = insert_all(table, KEYWORDS);
    insert_all(table, ALTERNATE_SPELLINGS)
}

const fn insert_all(
    mut table: [Option<(&'static str, Token)>; KEYWORD_TABLE_SIZE],
    words: &[(&'static str, Token)],
) -> [Option<(&'static str, Token)>; KEYWORD_TABLE_SIZE] {
    let mut i = 0;
    while i < words.len() {
        let (word, token) = words[i];
        let h = keyword_hash(word.as_bytes());
        if table[h].is_some() {
            panic!("keyword hash collision");
        }
        table[h] = Some((word, token));
        i += 1;
    }
    table
}

/// Looks up a keyword, returning the token it scans as.
pub fn lookup(word: &str) -> Option<Token> {
    let bytes = word.as_bytes();
    if bytes.len() < 2 || !bytes.iter().all(u8::is_ascii_lowercase) {
        return None;
    }
    match KEYWORD_TABLE[keyword_hash(bytes)] {
        Some((keyword, token)) if keyword == word => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_no_collisions_among_all_spellings() {
        let mut slots = HashMap::new();
        for (word, _) in KEYWORDS.iter().chain(ALTERNATE_SPELLINGS) {
            if let Some(other) = slots.insert(keyword_hash(word.as_bytes()), *word) {
                panic!("{word} collides with {other}");
            }
        }
        assert_eq!(slots.len(), KEYWORDS.len() + ALTERNATE_SPELLINGS.len());
    }

    #[test]
    fn test_every_spelling_resolves() {
        for (word, token) in KEYWORDS.iter().chain(ALTERNATE_SPELLINGS) {
            assert_eq!(lookup(word), Some(*token), "{word}");
        }
    }

    #[test]
    fn test_every_keyword_token_is_spelled() {
        for token in Token::keywords() {
            assert_eq!(lookup(token.as_str()), Some(token));
        }
    }

    #[test]
    fn test_non_keywords() {
        for word in ["x", "main", "fun", "func_", "Func", "enums", "_", "fnn", "mapp"] {
            assert_eq!(lookup(word), None, "{word}");
        }
        assert_eq!(lookup("fn"), Some(Token::Func));
    }
}
