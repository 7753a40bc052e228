use crate::decoder::Decoded;
use crate::instructions::{basic_mnemonic, has_word, special_mnemonic};
use crate::operand::{Immediate, Operand, Role};
use crate::program::{Instruction, Program};

/// Rebuilds the instruction list from a raw word stream. Words that do not
/// decode to a known instruction, including an instruction cut short by the
/// end of the stream, come back as single-word `DAT`.
pub fn disassemble(words: &[u16]) -> Program {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < words.len() {
        let word = words[pos];
        pos += 1;
        match decode_at(word, &words[pos..]) {
            Some((ins, used)) => {
                pos += used;
                out.push(ins);
            }
            None => out.push(Instruction::Data { words: vec![Immediate::Value(word)] }),
        }
    }
    tracing::debug!(words = words.len(), instructions = out.len(), "disassembled");
    Program::place(out)
}

/// Decodes one instruction whose opcode word is `word`, taking trailing
/// words from `rest` (source first). Returns the instruction and the number
/// of trailing words consumed.
pub fn decode_at(word: u16, rest: &[u16]) -> Option<(Instruction, usize)> {
    let d = Decoded::decode(word);
    let mut trailing = rest.iter().copied();
    let mut used = 0;
    let mut take = |code: u8, role: Role| -> Option<Operand> {
        let imm = if has_word(code) {
            used += 1;
            Some(Immediate::Value(trailing.next()?))
        } else {
            None
        };
        Some(Operand::new(role, code, imm))
    };
    let ins = if !d.is_special() && basic_mnemonic(d.op).is_some() {
        let src = take(d.src, Role::Src)?;
        let dst = take(d.dst, Role::Dst)?;
        Instruction::Basic { opcode: d.op, dst, src }
    } else if d.is_special() && special_mnemonic(d.dst).is_some() {
        let src = take(d.src, Role::Src)?;
        Instruction::Special { opcode: d.dst, src }
    } else {
        return None;
    };
    Some((ins, used))
}

/// One-line rendering of the instruction at the start of `words`.
pub fn fmt_words(words: &[u16]) -> String {
    match words.split_first() {
        Some((&first, rest)) => match decode_at(first, rest) {
            Some((ins, _)) => ins.to_string(),
            None => Instruction::Data { words: vec![Immediate::Value(first)] }.to_string(),
        },
        None => String::new(),
    }
}
