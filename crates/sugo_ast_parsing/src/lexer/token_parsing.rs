//! nom parsers for the parts of a token that can be recognized without the scanner's cursor:
//! identifiers, digit runs and escape sequences.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1, take_while_m_n};
use nom::character::complete::{anychar, one_of};
use nom::combinator::{map, value, verify};
use nom::IResult;

type Result<'a, O> = IResult<&'a str, O>;

/// Recognizes an identifier: Unicode letters, digits and `_`.
pub fn identifier(input: &str) -> Result<&str> {
    take_while1(|c: char| c == '_' || c.is_alphanumeric())(input)
}

/// A run of `{ digit | '_' }`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Digits {
    /// Length in bytes
    pub len: usize,
    /// Bit 0 is set if a digit was seen, bit 1 if a `_` was seen
    pub digsep: u8,
    /// Index of the first decimal digit that is not valid in the base, for bases up to 10
    pub invalid: Option<usize>,
}

/// Recognizes `{ digit | '_' }`. For bases up to 10 any decimal digit is accepted and the
/// first one that is out of range for `base` is recorded.
pub fn digits(input: &str, base: u32) -> Digits {
    let accept = |c: char| {
        c == '_'
            || if base <= 10 {
                c.is_ascii_digit()
            } else {
                c.is_ascii_hexdigit()
            }
    };
    let run = match take_while::<_, _, nom::error::Error<&str>>(accept)(input) {
        Ok((_, run)) => run,
        Err(_) => "",
    };
    let mut digsep = 0;
    let mut invalid = None;
    for (i, c) in run.char_indices() {
        if c == '_' {
            digsep |= 2;
            continue;
        }
        digsep |= 1;
        if base <= 10 && invalid.is_none() && c.to_digit(10).is_some_and(|d| d >= base) {
            invalid = Some(i);
        }
    }
    Digits {
        len: run.len(),
        digsep,
        invalid,
    }
}

/// Returns the index of the first `_` in a number literal that does not separate two
/// digits (a base prefix counts as a digit).
pub fn invalid_sep(lit: &str) -> Option<usize> {
    let bytes = lit.as_bytes();
    let mut x1 = b' ';
    // one of '_', '0' (a digit) or '.' (anything else)
    let mut d = b'.';
    let mut i = 0;

    if bytes.len() >= 2 && bytes[0] == b'0' {
        x1 = bytes[1].to_ascii_lowercase();
        if matches!(x1, b'x' | b'o' | b'b') {
            d = b'0';
            i = 2;
        }
    }

    while i < bytes.len() {
        let p = d;
        d = bytes[i];
        if d == b'_' {
            if p != b'0' {
                return Some(i);
            }
        } else if d.is_ascii_digit() || (x1 == b'x' && d.is_ascii_hexdigit()) {
            d = b'0';
        } else {
            if p == b'_' {
                return Some(i - 1);
            }
            d = b'.';
        }
        i += 1;
    }
    (d == b'_').then(|| bytes.len() - 1)
}

pub fn base_name(base: u32) -> &'static str {
    match base {
        2 => "binary",
        8 => "octal",
        10 => "decimal",
        16 => "hexadecimal",
        _ => unreachable!("invalid base {base}"),
    }
}

/// Formats a code point as `U+0040 '@'`, leaving out the character if it is not printable.
pub fn unicode_repr(x: u32) -> String {
    match char::from_u32(x) {
        Some(c) if !c.is_control() => format!("U+{x:04X} {c:?}"),
        _ => format!("U+{x:04X}"),
    }
}

/// The outcome of scanning one escape sequence, the leading `\` already consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escape {
    /// A valid escape sequence of the given length in bytes
    Valid(usize),
    /// The input ended inside the escape sequence after the given number of bytes; the caller
    /// reports the unterminated literal.
    Truncated(usize),
    /// An invalid escape sequence. The error is reported `at` bytes into the input and `len`
    /// bytes are consumed.
    Invalid { at: usize, len: usize, msg: String },
}

fn simple_escape(quote: char) -> impl FnMut(&str) -> Result<usize> {
    move |input| {
        map(
            alt((
                value((), verify(anychar, |c: &char| *c == quote)),
                value((), one_of("abfnrtv\\")),
            )),
            |_| 1,
        )(input)
    }
}

/// Validates the escape sequence at the start of `input`.
pub fn escape(input: &str, quote: char) -> Escape {
    if let Ok((_, len)) = simple_escape(quote)(input) {
        return Escape::Valid(len);
    }
    let (prefix, n, base, max) = match input.chars().next() {
        None => return Escape::Truncated(0),
        Some('0'..='7') => (0, 3, 8, 255),
        Some('x') => (1, 2, 16, 255),
        Some('u') => (1, 4, 16, char::MAX as u32),
        Some('U') => (1, 8, 16, char::MAX as u32),
        Some(_) => {
            return Escape::Invalid {
                at: 0,
                len: 0,
                msg: "unknown escape".to_string(),
            }
        }
    };

    let body = &input[prefix..];
    let in_base = |c: char| c.is_digit(base);
    let (rest, digits) =
        match take_while_m_n::<_, _, nom::error::Error<&str>>(0, n, in_base)(body) {
            Ok(ok) => ok,
            Err(_) => (body, ""),
        };
    let consumed = prefix + digits.len();
    if digits.len() < n {
        return match rest.chars().next() {
            None => Escape::Truncated(consumed),
            Some(c) => Escape::Invalid {
                at: consumed,
                len: consumed,
                msg: format!("invalid character {c:?} in {} escape", base_name(base)),
            },
        };
    }

    let x = u32::from_str_radix(digits, base).unwrap_or(u32::MAX);
    let msg = if x > max && base == 8 {
        format!("octal escape value {x} > 255")
    } else if x > max || (0xD800..0xE000).contains(&x) {
        format!("escape is invalid Unicode code point {}", unicode_repr(x))
    } else {
        return Escape::Valid(consumed);
    };
    Escape::Invalid {
        at: consumed,
        len: consumed,
        msg,
    }
}

/// Recognizes a `//go:` or `//line ` directive prefix directly after the comment opener.
pub fn directive_prefix(input: &str) -> Result<&str> {
    alt((tag("go:"), tag("line ")))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::Finish;

    #[test]
    fn test_identifier() {
        let (rest, id) = identifier("héllo_1 + 2").finish().unwrap();
        assert_eq!(id, "héllo_1");
        assert_eq!(rest, " + 2");
        assert!(identifier("+x").is_err());
    }

    #[test]
    fn test_digits_records_first_invalid() {
        let d = digits("1_2893x", 8);
        assert_eq!(d.len, 6);
        assert_eq!(d.digsep, 3);
        assert_eq!(d.invalid, Some(3));
        assert_eq!(digits("ff_0", 16).invalid, None);
        assert_eq!(digits("ff_0", 16).len, 4);
        assert_eq!(digits("x", 10).digsep, 0);
    }

    #[test]
    fn test_invalid_sep() {
        assert_eq!(invalid_sep("1_000"), None);
        assert_eq!(invalid_sep("0x_1f"), None);
        assert_eq!(invalid_sep("1__0"), Some(2));
        assert_eq!(invalid_sep("10_"), Some(2));
        assert_eq!(invalid_sep("1_.5"), Some(1));
        assert_eq!(invalid_sep("_1"), Some(0));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(escape("n\"", '"'), Escape::Valid(1));
        assert_eq!(escape("'", '\''), Escape::Valid(1));
        assert_eq!(escape("x41", '"'), Escape::Valid(3));
        assert_eq!(escape("101", '"'), Escape::Valid(3));
        assert_eq!(escape("u00e9", '"'), Escape::Valid(5));
        assert_eq!(escape("x4", '"'), Escape::Truncated(2));
        assert!(matches!(
            escape("q", '"'),
            Escape::Invalid { ref msg, .. } if msg == "unknown escape"
        ));
        assert!(matches!(
            escape("'", '"'),
            Escape::Invalid { ref msg, .. } if msg == "unknown escape"
        ));
        assert!(matches!(
            escape("x4g", '"'),
            Escape::Invalid { at: 2, ref msg, .. } if msg == "invalid character 'g' in hexadecimal escape"
        ));
        assert!(matches!(
            escape("400", '"'),
            Escape::Invalid { ref msg, .. } if msg == "octal escape value 256 > 255"
        ));
        assert!(matches!(
            escape("ud800", '"'),
            Escape::Invalid { ref msg, .. } if msg == "escape is invalid Unicode code point U+D800"
        ));
    }

    #[test]
    fn test_directive_prefix() {
        assert!(directive_prefix("go:noinline").is_ok());
        assert!(directive_prefix("line foo.go:10").is_ok());
        assert!(directive_prefix("lines").is_err());
        assert!(directive_prefix(" go:x").is_err());
    }
}
