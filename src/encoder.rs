//! Bit layout of assembled instructions.

use crate::decoder::Decoded;
use crate::error::Result;
use crate::program::{Instruction, SymbolTable};

/// Opcode word of an instruction, if it has one.
pub fn opcode_word(ins: &Instruction) -> Option<u16> {
    match ins {
        Instruction::Basic { opcode, dst, src } => Some(
            Decoded {
                op: *opcode,
                dst: dst.code,
                src: src.code,
            }
            .encode(),
        ),
        Instruction::Special { opcode, src } => Some(
            Decoded {
                op: 0,
                dst: *opcode,
                src: src.code,
            }
            .encode(),
        ),
        Instruction::Command { word } => Some(*word),
        _ => None,
    }
}

/// Encodes one instruction: opcode word, then the source trailing word,
/// then the destination trailing word.
pub fn encode_instruction(ins: &Instruction, symbols: &SymbolTable) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(ins.size());
    out.extend(opcode_word(ins));
    match ins {
        Instruction::Basic { dst, src, .. } => {
            out.extend(src.assemble(symbols)?);
            out.extend(dst.assemble(symbols)?);
        }
        Instruction::Special { src, .. } => out.extend(src.assemble(symbols)?),
        Instruction::Data { words } => {
            for w in words {
                out.push(w.resolve(symbols)?);
            }
        }
        Instruction::Reserve { count } => out.resize(*count as usize, 0),
        Instruction::Command { .. } | Instruction::Label { .. } => {}
    }
    Ok(out)
}
