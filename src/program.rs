//! Instruction list, offset assignment and symbol resolution.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoder::encode_instruction;
use crate::error::{AsmError, Result};
use crate::instructions::{basic_mnemonic, command_mnemonic, is_conditional, special_mnemonic};
use crate::operand::{pretty_value, Immediate, Operand};

pub type SymbolTable = BTreeMap<String, u16>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    Basic { opcode: u8, dst: Operand, src: Operand },
    Special { opcode: u8, src: Operand },
    /// Operand-less mnemonic standing for a fixed word (`NOP`, `BRK`, `RFI`).
    Command { word: u16 },
    Data { words: Vec<Immediate> },
    /// `offset` is set for `:name @ addr`, which pins the label to `addr`
    /// instead of the running offset.
    Label { name: String, offset: Option<u16> },
    Reserve { count: u16 },
}

impl Instruction {
    /// Words this instruction occupies in the image.
    pub fn size(&self) -> usize {
        match self {
            Instruction::Basic { dst, src, .. } => 1 + dst.size() as usize + src.size() as usize,
            Instruction::Special { src, .. } => 1 + src.size() as usize,
            Instruction::Command { .. } => 1,
            Instruction::Data { words } => words.len(),
            Instruction::Label { .. } => 0,
            Instruction::Reserve { count } => *count as usize,
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Instruction::Basic { opcode, .. } if is_conditional(*opcode))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Basic { opcode, dst, src } => {
                write!(f, "{} {}, {}", basic_mnemonic(*opcode).unwrap_or("???"), dst, src)
            }
            Instruction::Special { opcode, src } => {
                write!(f, "{} {}", special_mnemonic(*opcode).unwrap_or("???"), src)
            }
            Instruction::Command { word } => match command_mnemonic(*word) {
                Some(m) => f.write_str(m),
                None => write!(f, "DAT {}", pretty_value(*word)),
            },
            Instruction::Data { words } => {
                let list: Vec<String> = words.iter().map(|w| w.to_string()).collect();
                write!(f, "DAT {}", list.join(", "))
            }
            Instruction::Label { name, offset: None } => write!(f, ":{name}"),
            Instruction::Label { name, offset: Some(at) } => write!(f, ":{name} @ {}", pretty_value(*at)),
            Instruction::Reserve { count } => write!(f, "RESERVE {}", pretty_value(*count)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placed {
    pub offset: u16,
    pub instruction: Instruction,
}

/// An instruction list with offsets and labels fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    items: Vec<Placed>,
    symbols: SymbolTable,
    size: usize,
}

impl Program {
    /// Assigns every instruction its word offset and records each label at
    /// the offset of the instruction that follows it, or at its pinned
    /// address.
    pub fn build(instructions: Vec<Instruction>) -> Result<Self> {
        let mut symbols = SymbolTable::new();
        let program = Self::place(instructions);
        for item in &program.items {
            if let Instruction::Label { name, .. } = &item.instruction {
                if symbols.insert(name.clone(), item.offset).is_some() {
                    return Err(AsmError::DuplicateLabel { name: name.clone() });
                }
            }
        }
        tracing::debug!(
            instructions = program.items.len(),
            symbols = symbols.len(),
            size = program.size,
            "program built"
        );
        Ok(Self { symbols, ..program })
    }

    /// Assigns offsets only. Used directly for label-free code such as a
    /// disassembly.
    pub(crate) fn place(instructions: Vec<Instruction>) -> Self {
        let mut size = 0usize;
        let mut items = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            let offset = match &instruction {
                Instruction::Label { offset: Some(at), .. } => *at,
                _ => (size % 0x10000) as u16,
            };
            size += instruction.size();
            items.push(Placed { offset, instruction });
        }
        Self { items, symbols: SymbolTable::new(), size }
    }

    pub fn items(&self) -> &[Placed] {
        &self.items
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.items.iter().map(|p| &p.instruction)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Resolves symbolic trailing words and emits the word stream.
    pub fn encode(&self) -> Result<Vec<u16>> {
        let mut out = Vec::with_capacity(self.size);
        for item in &self.items {
            out.extend(encode_instruction(&item.instruction, &self.symbols)?);
        }
        Ok(out)
    }

    /// Listing that re-assembles to the same words. Code lines carry their
    /// encoding as a trailing comment; lines after a conditional are
    /// indented one more level.
    pub fn pretty(&self) -> String {
        let mut lines = Vec::with_capacity(self.items.len());
        let mut after_conditional = false;
        for item in &self.items {
            let ins = &item.instruction;
            let pad = match ins {
                Instruction::Label { .. } => 0,
                _ if after_conditional => 4,
                _ => 2,
            };
            let mut line = format!("{:pad$}{}", "", ins);
            let dump = matches!(
                ins,
                Instruction::Basic { .. } | Instruction::Special { .. } | Instruction::Command { .. }
            );
            if dump {
                if let Ok(words) = encode_instruction(ins, &self.symbols) {
                    let hex: Vec<String> = words.iter().map(|w| format!("{w:04x}")).collect();
                    line = format!("{line:<32}; {}", hex.join(" "));
                }
            }
            lines.push(line);
            after_conditional = ins.is_conditional();
        }
        lines.join("\n")
    }
}
