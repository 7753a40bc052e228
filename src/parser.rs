//! Recursive-descent parser from tokens to the instruction list.

use crate::error::{AsmError, Result};
use crate::instructions::{
    basic_opcode, class, command_word, fold_literal, is_reserved, register, special_opcode,
};
use crate::lexer::{tokenize, Lexeme, Token};
use crate::operand::{Immediate, Operand, Role};
use crate::program::Instruction;

/// Parses source text into instructions. Symbols stay unresolved.
pub fn parse(source: &str) -> Result<Vec<Instruction>> {
    let tokens = tokenize(source)?;
    let mut p = Parser { tokens, pos: 0, scope: None };
    let mut out = Vec::new();
    loop {
        while p.peek_is(|t| *t == Token::Newline) {
            p.pos += 1;
        }
        if p.pos >= p.tokens.len() {
            break;
        }
        out.push(p.statement()?);
    }
    tracing::debug!(statements = out.len(), "parsed source");
    Ok(out)
}

struct Parser {
    tokens: Vec<Lexeme>,
    pos: usize,
    /// Last non-local label, prefixed onto `.local` names.
    scope: Option<String>,
}

impl Parser {
    fn peek(&self) -> Option<&Lexeme> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, f: impl Fn(&Token) -> bool) -> bool {
        self.peek().map(|l| f(&l.token)).unwrap_or(false)
    }

    fn next(&mut self) -> Result<Lexeme> {
        match self.tokens.get(self.pos) {
            Some(l) => {
                self.pos += 1;
                Ok(l.clone())
            }
            None => Err(AsmError::Parse {
                line: self.tokens.last().map(|l| l.line).unwrap_or(1),
                text: "end of input".into(),
            }),
        }
    }

    fn expect(&mut self, want: Token) -> Result<()> {
        let lx = self.next()?;
        if lx.token == want {
            Ok(())
        } else {
            Err(unexpected(&lx))
        }
    }

    fn qualify(&self, name: &str) -> String {
        match (&self.scope, name.starts_with('.')) {
            (Some(scope), true) => format!("{scope}{name}"),
            _ => name.to_string(),
        }
    }

    fn statement(&mut self) -> Result<Instruction> {
        let lx = self.next()?;
        let word = match &lx.token {
            Token::Label(name) => {
                if is_reserved(name) {
                    return Err(unexpected(&lx));
                }
                let full = self.qualify(name);
                if !name.starts_with('.') {
                    self.scope = Some(full.clone());
                }
                let offset = if self.peek_is(|t| *t == Token::At) {
                    self.pos += 1;
                    let at = self.next()?;
                    match at.token {
                        Token::Number(n) | Token::Char(n) => Some(n),
                        _ => return Err(unexpected(&at)),
                    }
                } else {
                    None
                };
                return Ok(Instruction::Label { name: full, offset });
            }
            Token::Ident(word) => word.to_ascii_uppercase(),
            _ => return Err(unexpected(&lx)),
        };

        if word == "DAT" {
            return self.data(&lx);
        }
        if word == "RESERVE" {
            let count = self.next()?;
            return match count.token {
                Token::Number(n) | Token::Char(n) => Ok(Instruction::Reserve { count: n }),
                _ => Err(unexpected(&count)),
            };
        }
        if let Some(opcode) = basic_opcode(&word) {
            let dst = self.operand(Role::Dst)?;
            let src = self.operand(Role::Src)?;
            return Ok(Instruction::Basic { opcode, dst, src });
        }
        if let Some(opcode) = special_opcode(&word) {
            let has_operand = self.peek_is(|t| {
                matches!(t, Token::LBrack | Token::Number(_) | Token::Char(_) | Token::Ident(_))
            });
            if has_operand || command_word(&word).is_none() {
                let src = self.operand(Role::Src)?;
                return Ok(Instruction::Special { opcode, src });
            }
        }
        match command_word(&word) {
            Some(w) => Ok(Instruction::Command { word: w }),
            None => Err(unexpected(&lx)),
        }
    }

    fn data(&mut self, dat: &Lexeme) -> Result<Instruction> {
        let mut words = Vec::new();
        while let Some(lx) = self.peek().cloned() {
            match lx.token {
                Token::Number(n) | Token::Char(n) => words.push(Immediate::Value(n)),
                Token::Str(s) => words.extend(s.chars().map(|c| Immediate::Value(u32::from(c) as u16))),
                Token::Ident(ref id) if !is_reserved(id) => words.push(Immediate::Symbol(self.qualify(id))),
                _ => break,
            }
            self.pos += 1;
        }
        if words.is_empty() {
            return Err(match self.peek() {
                Some(lx) => unexpected(lx),
                None => unexpected(dat),
            });
        }
        Ok(Instruction::Data { words })
    }

    /// A literal or symbol used as a trailing word.
    fn immediate(&mut self) -> Result<Immediate> {
        let lx = self.next()?;
        match &lx.token {
            Token::Number(n) | Token::Char(n) => Ok(Immediate::Value(*n)),
            Token::Ident(id) if !is_reserved(id) => Ok(Immediate::Symbol(self.qualify(id))),
            _ => Err(unexpected(&lx)),
        }
    }

    fn operand(&mut self, role: Role) -> Result<Operand> {
        let lx = self.next()?;
        match &lx.token {
            Token::LBrack => self.bracketed(role, &lx),
            Token::Number(n) | Token::Char(n) => literal(role, Immediate::Value(*n), &lx),
            Token::Ident(id) => {
                if let Some(r) = register(id) {
                    return Ok(Operand::new(role, class::REG + r, None));
                }
                let code = match (id.to_ascii_uppercase().as_str(), role) {
                    ("PUSH", Role::Dst) | ("POP", Role::Src) => class::STACK,
                    ("PUSH", Role::Src) | ("POP", Role::Dst) => return Err(invalid(&lx)),
                    ("PEEK", _) => class::PEEK,
                    ("SP", _) => class::SP,
                    ("PC", _) => class::PC,
                    ("EX", _) => class::EX,
                    ("PICK", _) => {
                        let word = self.immediate()?;
                        return Ok(Operand::new(role, class::PICK, Some(word)));
                    }
                    ("LONG", _) => {
                        let word = self.immediate()?;
                        return Ok(Operand::new(role, class::WORD, Some(word)));
                    }
                    _ if is_reserved(id) => return Err(unexpected(&lx)),
                    _ => return literal(role, Immediate::Symbol(self.qualify(id)), &lx),
                };
                Ok(Operand::new(role, code, None))
            }
            _ => Err(unexpected(&lx)),
        }
    }

    fn bracketed(&mut self, role: Role, open: &Lexeme) -> Result<Operand> {
        let first = self.next()?;
        let op = match &first.token {
            Token::Dec => {
                self.expect_sp()?;
                if role != Role::Dst {
                    return Err(invalid(open));
                }
                Operand::new(role, class::STACK, None)
            }
            Token::Ident(id) if register(id).is_some() => {
                let r = register(id).unwrap_or_default();
                if self.peek_is(|t| *t == Token::Plus) {
                    self.pos += 1;
                    let word = self.immediate()?;
                    Operand::new(role, class::AT_REG_WORD + r, Some(word))
                } else {
                    Operand::new(role, class::AT_REG + r, None)
                }
            }
            Token::Ident(id) if id.eq_ignore_ascii_case("SP") => {
                if self.peek_is(|t| *t == Token::Inc) {
                    self.pos += 1;
                    if role != Role::Src {
                        return Err(invalid(open));
                    }
                    Operand::new(role, class::STACK, None)
                } else if self.peek_is(|t| *t == Token::Plus) {
                    self.pos += 1;
                    let word = self.immediate()?;
                    Operand::new(role, class::PICK, Some(word))
                } else {
                    Operand::new(role, class::PEEK, None)
                }
            }
            _ => {
                self.pos -= 1;
                let word = self.immediate()?;
                if self.peek_is(|t| *t == Token::Plus) {
                    self.pos += 1;
                    let base = self.next()?;
                    match &base.token {
                        Token::Ident(id) if register(id).is_some() => {
                            let r = register(id).unwrap_or_default();
                            Operand::new(role, class::AT_REG_WORD + r, Some(word))
                        }
                        Token::Ident(id) if id.eq_ignore_ascii_case("SP") => {
                            Operand::new(role, class::PICK, Some(word))
                        }
                        _ => return Err(unexpected(&base)),
                    }
                } else {
                    Operand::new(role, class::AT_WORD, Some(word))
                }
            }
        };
        self.expect(Token::RBrack)?;
        Ok(op)
    }

    fn expect_sp(&mut self) -> Result<()> {
        let lx = self.next()?;
        match &lx.token {
            Token::Ident(id) if id.eq_ignore_ascii_case("SP") => Ok(()),
            _ => Err(unexpected(&lx)),
        }
    }
}

/// Bare literal operand. Small source literals fold into the class code;
/// a destination has no room for a folded literal. `LONG n` always keeps
/// the trailing word.
fn literal(role: Role, word: Immediate, lx: &Lexeme) -> Result<Operand> {
    if let Immediate::Value(v) = word {
        if let Some(code) = fold_literal(v) {
            return match role {
                Role::Src => Ok(Operand::new(role, code, None)),
                Role::Dst => Err(invalid(lx)),
            };
        }
    }
    Ok(Operand::new(role, class::WORD, Some(word)))
}

fn unexpected(lx: &Lexeme) -> AsmError {
    let text = if lx.token == Token::Newline { "end of line".to_string() } else { lx.text.clone() };
    AsmError::Parse { line: lx.line, text }
}

fn invalid(lx: &Lexeme) -> AsmError {
    AsmError::InvalidOperand { line: lx.line, text: lx.text.clone() }
}
