use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AsmError, Result};
use crate::instructions::{class, fold_literal, folded_value, REGISTERS};
use crate::program::SymbolTable;

/// A trailing word, either known or waiting for the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Immediate {
    Value(u16),
    Symbol(String),
}

impl Immediate {
    pub fn resolve(&self, symbols: &SymbolTable) -> Result<u16> {
        match self {
            Immediate::Value(v) => Ok(*v),
            Immediate::Symbol(name) => symbols
                .get(name)
                .copied()
                .ok_or_else(|| AsmError::UndefinedSymbol { name: name.clone() }),
        }
    }
}

/// Renders small values in decimal and everything else as four hex digits.
pub fn pretty_value(v: u16) -> String {
    if v <= 0xff {
        format!("{v}")
    } else {
        format!("{v:#06x}")
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Immediate::Value(v) => f.write_str(&pretty_value(*v)),
            Immediate::Symbol(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Dst,
    Src,
}

/// An operand class code plus its optional trailing word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    pub role: Role,
    pub code: u8,
    pub word: Option<Immediate>,
}

impl Operand {
    pub fn new(role: Role, code: u8, word: Option<Immediate>) -> Self {
        Self { role, code, word }
    }

    pub fn size(&self) -> u16 {
        self.word.is_some() as u16
    }

    /// Literal value carried by the operand, folded or trailing.
    pub fn literal(&self) -> Option<u16> {
        match (self.code, &self.word) {
            (class::WORD, Some(Immediate::Value(v))) => Some(*v),
            (code, None) => folded_value(code),
            _ => None,
        }
    }

    pub fn assemble(&self, symbols: &SymbolTable) -> Result<Option<u16>> {
        self.word.as_ref().map(|w| w.resolve(symbols)).transpose()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = || {
            self.word
                .as_ref()
                .map(|w| w.to_string())
                .unwrap_or_else(|| "0".to_string())
        };
        match self.code {
            c @ 0x00..=0x07 => f.write_str(REGISTERS[c as usize]),
            c @ 0x08..=0x0f => write!(f, "[{}]", REGISTERS[(c - class::AT_REG) as usize]),
            c @ 0x10..=0x17 => write!(f, "[{} + {}]", REGISTERS[(c - class::AT_REG_WORD) as usize], word()),
            class::STACK => f.write_str(match self.role {
                Role::Dst => "PUSH",
                Role::Src => "POP",
            }),
            class::PEEK => f.write_str("PEEK"),
            class::PICK => write!(f, "PICK {}", word()),
            class::SP => f.write_str("SP"),
            class::PC => f.write_str("PC"),
            class::EX => f.write_str("EX"),
            class::AT_WORD => write!(f, "[{}]", word()),
            // a small value needs the long spelling to keep its trailing word
            class::WORD => match &self.word {
                Some(Immediate::Value(v)) if fold_literal(*v).is_some() => write!(f, "LONG {}", word()),
                _ => f.write_str(&word()),
            },
            c => f.write_str(&pretty_value(folded_value(c).unwrap_or(0))),
        }
    }
}
