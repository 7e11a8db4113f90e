//! Tokenizer for the expression language

use tally_core::TallyError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `^` or `**`
    Power,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    StrictEq,
    StrictNotEq,
    AndAnd,
    OrOr,
    Bang,
    Question,
    Colon,
    LParen,
    RParen,
    Comma,
    Dot,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset in the source
    pub pos: usize,
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_continue(c: u8) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Split `input` into tokens, ending with [`TokenKind::Eof`]
pub fn tokenize(input: &str) -> Result<Vec<Token>, TallyError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let two = |a: u8, b: u8| c == a && bytes.get(i + 1) == Some(&b);
        let three = |a: u8, b: u8, d: u8| two(a, b) && bytes.get(i + 2) == Some(&d);

        let (kind, len) = if c.is_ascii_digit() || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            let len = scan_number(&bytes[i..]);
            let text = &input[i..i + len];
            let value = text
                .parse::<f64>()
                .map_err(|_| TallyError::parse_error(format!("invalid number '{}'", text)).at(start))?;
            (TokenKind::Number(value), len)
        } else if is_ident_start(c) {
            let len = bytes[i..].iter().take_while(|b| is_ident_continue(**b)).count();
            (TokenKind::Ident(input[i..i + len].to_string()), len)
        } else if three(b'=', b'=', b'=') {
            (TokenKind::StrictEq, 3)
        } else if three(b'!', b'=', b'=') {
            (TokenKind::StrictNotEq, 3)
        } else if two(b'*', b'*') {
            (TokenKind::Power, 2)
        } else if two(b'<', b'=') {
            (TokenKind::Le, 2)
        } else if two(b'>', b'=') {
            (TokenKind::Ge, 2)
        } else if two(b'=', b'=') {
            (TokenKind::EqEq, 2)
        } else if two(b'!', b'=') {
            (TokenKind::NotEq, 2)
        } else if two(b'&', b'&') {
            (TokenKind::AndAnd, 2)
        } else if two(b'|', b'|') {
            (TokenKind::OrOr, 2)
        } else {
            let kind = match c {
                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'*' => TokenKind::Star,
                b'/' => TokenKind::Slash,
                b'%' => TokenKind::Percent,
                b'^' => TokenKind::Power,
                b'<' => TokenKind::Lt,
                b'>' => TokenKind::Gt,
                b'!' => TokenKind::Bang,
                b'?' => TokenKind::Question,
                b':' => TokenKind::Colon,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b',' => TokenKind::Comma,
                b'.' => TokenKind::Dot,
                _ => {
                    let ch = input[i..].chars().next().unwrap_or('?');
                    return Err(TallyError::parse_error(format!("unexpected character '{}'", ch)).at(start));
                }
            };
            (kind, 1)
        };

        tokens.push(Token { kind, pos: start });
        i += len;
    }

    tokens.push(Token { kind: TokenKind::Eof, pos: bytes.len() });
    Ok(tokens)
}

/// Length of the numeric literal at the start of `bytes`.
///
/// An exponent is consumed only when at least one digit follows it.
fn scan_number(bytes: &[u8]) -> usize {
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut len = digits(0);
    if bytes.get(len) == Some(&b'.') {
        len += 1 + digits(len + 1);
    }
    if matches!(bytes.get(len), Some(b'e') | Some(b'E')) {
        let mut exp = len + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let n = digits(exp);
        if n > 0 {
            len = exp + n;
        }
    }
    len
}
