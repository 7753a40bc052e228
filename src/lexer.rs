//! Token stream for assembly source.

use logos::Logos;

use crate::error::{AsmError, Result};

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f,]+")]
#[logos(skip r";[^\n]*")]
pub enum Token {
    #[token("\n")]
    Newline,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("+")]
    Plus,
    /// Separates a label from a fixed address: `:name @ 0x8000`.
    #[token("@")]
    At,
    /// Decimal, `0x` hex or leading-zero octal, reduced modulo 65536.
    #[regex(r"-?[0-9][0-9a-zA-Z_]*", number)]
    Number(u16),
    #[regex(r#""[^"\n]*""#, |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    Str(String),
    #[regex(r"'[^'\n]'", character)]
    Char(u16),
    /// `:name` declaration, without the colon. Qualified local names such
    /// as `main.loop` lex as one label.
    #[regex(r":\.?[a-zA-Z_][a-zA-Z0-9_.]*", |lex| lex.slice()[1..].to_string())]
    Label(String),
    #[regex(r"\.?[a-zA-Z_][a-zA-Z0-9_.]*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn number(lex: &mut logos::Lexer<Token>) -> Option<u16> {
    parse_number(lex.slice())
}

fn character(lex: &mut logos::Lexer<Token>) -> Option<u16> {
    let c = lex.slice().chars().nth(1)?;
    u16::try_from(u32::from(c)).ok()
}

/// Parses a numeric literal the way the assembler reads it. Digits are
/// accumulated modulo 65536, so any length of literal wraps.
pub fn parse_number(text: &str) -> Option<u16> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if digits.is_empty() {
        return None;
    }
    let mut value: u32 = 0;
    for c in digits.chars() {
        value = (value * radix + c.to_digit(radix)?) % 0x10000;
    }
    let value = if negative { (0x10000 - value) % 0x10000 } else { value };
    Some(value as u16)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub line: usize,
    pub text: String,
}

pub fn tokenize(source: &str) -> Result<Vec<Lexeme>> {
    let mut out = Vec::new();
    let mut line = 1;
    let mut lex = Token::lexer(source);
    while let Some(res) = lex.next() {
        let text = lex.slice().to_string();
        match res {
            Ok(token) => {
                let newline = token == Token::Newline;
                out.push(Lexeme { token, line, text });
                if newline {
                    line += 1;
                }
            }
            Err(()) => return Err(AsmError::Lex { line, text }),
        }
    }
    Ok(out)
}
