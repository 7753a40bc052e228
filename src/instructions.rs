//! Opcode, register and operand-class tables shared by the assembler,
//! the disassembler and the engine.

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub code: u8,
    pub mnemonic: &'static str,
}

/// Two-operand opcodes (low five bits of the instruction word).
pub const BASIC: &[InstrDesc] = &[
    InstrDesc { code: 0x01, mnemonic: "SET" },
    InstrDesc { code: 0x02, mnemonic: "ADD" },
    InstrDesc { code: 0x03, mnemonic: "SUB" },
    InstrDesc { code: 0x04, mnemonic: "MUL" },
    InstrDesc { code: 0x05, mnemonic: "MLI" },
    InstrDesc { code: 0x06, mnemonic: "DIV" },
    InstrDesc { code: 0x07, mnemonic: "DVI" },
    InstrDesc { code: 0x08, mnemonic: "MOD" },
    InstrDesc { code: 0x09, mnemonic: "MDI" },
    InstrDesc { code: 0x0a, mnemonic: "AND" },
    InstrDesc { code: 0x0b, mnemonic: "BOR" },
    InstrDesc { code: 0x0c, mnemonic: "XOR" },
    InstrDesc { code: 0x0d, mnemonic: "SHR" },
    InstrDesc { code: 0x0e, mnemonic: "ASR" },
    InstrDesc { code: 0x0f, mnemonic: "SHL" },
    InstrDesc { code: 0x10, mnemonic: "IFB" },
    InstrDesc { code: 0x11, mnemonic: "IFC" },
    InstrDesc { code: 0x12, mnemonic: "IFE" },
    InstrDesc { code: 0x13, mnemonic: "IFN" },
    InstrDesc { code: 0x14, mnemonic: "IFG" },
    InstrDesc { code: 0x15, mnemonic: "IFA" },
    InstrDesc { code: 0x16, mnemonic: "IFL" },
    InstrDesc { code: 0x17, mnemonic: "IFU" },
    InstrDesc { code: 0x1a, mnemonic: "ADX" },
    InstrDesc { code: 0x1b, mnemonic: "SBX" },
    InstrDesc { code: 0x1e, mnemonic: "STI" },
    InstrDesc { code: 0x1f, mnemonic: "STD" },
];

/// One-operand opcodes, stored in the destination field when the basic
/// opcode field is zero.
pub const SPECIAL: &[InstrDesc] = &[
    InstrDesc { code: 0x01, mnemonic: "JSR" },
    InstrDesc { code: 0x02, mnemonic: "BRK" },
    InstrDesc { code: 0x08, mnemonic: "INT" },
    InstrDesc { code: 0x09, mnemonic: "IAG" },
    InstrDesc { code: 0x0a, mnemonic: "IAS" },
    InstrDesc { code: 0x0b, mnemonic: "RFI" },
    InstrDesc { code: 0x0c, mnemonic: "IAQ" },
    InstrDesc { code: 0x10, mnemonic: "HWN" },
    InstrDesc { code: 0x11, mnemonic: "HWQ" },
    InstrDesc { code: 0x12, mnemonic: "HWI" },
];

/// Operand-less spellings that assemble to a fixed word.
pub const COMMANDS: &[(&str, u16)] = &[("NOP", 0x0000), ("BRK", 0x0040), ("RFI", 0x0160)];

pub const REGISTERS: [&str; 8] = ["A", "B", "C", "X", "Y", "Z", "I", "J"];

/// Operand class codes. Destinations use the low 32 codes only.
pub mod class {
    pub const REG: u8 = 0x00;
    pub const AT_REG: u8 = 0x08;
    pub const AT_REG_WORD: u8 = 0x10;
    /// PUSH as a destination, POP as a source.
    pub const STACK: u8 = 0x18;
    pub const PEEK: u8 = 0x19;
    pub const PICK: u8 = 0x1a;
    pub const SP: u8 = 0x1b;
    pub const PC: u8 = 0x1c;
    pub const EX: u8 = 0x1d;
    pub const AT_WORD: u8 = 0x1e;
    pub const WORD: u8 = 0x1f;
    /// Folded literal 0xffff.
    pub const MINUS_ONE: u8 = 0x20;
    /// Folded literals 0..=30 start here.
    pub const SMALL: u8 = 0x21;
    pub const SMALL_MAX: u16 = 30;
}

/// Whether an operand of this class is followed by a trailing word.
pub fn has_word(code: u8) -> bool {
    matches!(code, 0x10..=0x17 | class::PICK | class::AT_WORD | class::WORD)
}

/// Compare-and-skip opcodes.
pub fn is_conditional(op: u8) -> bool {
    (0x10..=0x17).contains(&op)
}

/// Literal value folded into a source class code, if any.
pub fn folded_value(code: u8) -> Option<u16> {
    match code {
        class::MINUS_ONE => Some(0xffff),
        c if c >= class::SMALL && c <= 0x3f => Some((c - class::SMALL) as u16),
        _ => None,
    }
}

/// Class code for a literal small enough to fold into a source operand.
pub fn fold_literal(value: u16) -> Option<u8> {
    match value {
        0xffff => Some(class::MINUS_ONE),
        v if v <= class::SMALL_MAX => Some(class::SMALL + v as u8),
        _ => None,
    }
}

fn by_code(table: &[InstrDesc], code: u8) -> Option<&'static str> {
    table.iter().find(|d| d.code == code).map(|d| d.mnemonic)
}

fn by_name(table: &[InstrDesc], name: &str) -> Option<u8> {
    table
        .iter()
        .find(|d| d.mnemonic.eq_ignore_ascii_case(name))
        .map(|d| d.code)
}

pub fn basic_mnemonic(code: u8) -> Option<&'static str> {
    by_code(BASIC, code)
}

pub fn basic_opcode(name: &str) -> Option<u8> {
    by_name(BASIC, name)
}

pub fn special_mnemonic(code: u8) -> Option<&'static str> {
    by_code(SPECIAL, code)
}

pub fn special_opcode(name: &str) -> Option<u8> {
    by_name(SPECIAL, name)
}

pub fn command_word(name: &str) -> Option<u16> {
    COMMANDS
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(name))
        .map(|&(_, w)| w)
}

pub fn command_mnemonic(word: u16) -> Option<&'static str> {
    COMMANDS.iter().find(|&&(_, w)| w == word).map(|&(m, _)| m)
}

pub fn register(name: &str) -> Option<u8> {
    REGISTERS
        .iter()
        .position(|r| r.eq_ignore_ascii_case(name))
        .map(|i| i as u8)
}

/// Names that can never be used as a label or symbol.
pub fn is_reserved(name: &str) -> bool {
    const KEYWORDS: &[&str] = &["PUSH", "POP", "PEEK", "PICK", "LONG", "SP", "PC", "EX", "DAT", "RESERVE"];
    basic_opcode(name).is_some()
        || special_opcode(name).is_some()
        || command_word(name).is_some()
        || register(name).is_some()
        || KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_folding_bounds() {
        assert_eq!(fold_literal(0), Some(0x21));
        assert_eq!(fold_literal(30), Some(0x3f));
        assert_eq!(fold_literal(31), None);
        assert_eq!(fold_literal(0xffff), Some(class::MINUS_ONE));
        for v in (0..=30).chain([0xffff]) {
            assert_eq!(fold_literal(v).and_then(folded_value), Some(v));
        }
        assert_eq!(folded_value(class::WORD), None);
    }

    #[test]
    fn trailing_word_classes() {
        let with_word: Vec<u8> = (0..0x40).filter(|&c| has_word(c)).collect();
        assert_eq!(with_word, vec![0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x1a, 0x1e, 0x1f]);
    }

    #[test]
    fn tables_look_up_both_ways() {
        assert_eq!(basic_opcode("sbx"), Some(0x1b));
        assert_eq!(basic_mnemonic(0x1f), Some("STD"));
        assert_eq!(basic_mnemonic(0x18), None);
        assert_eq!(special_opcode("Hwi"), Some(0x12));
        assert_eq!(special_mnemonic(0x00), None);
        assert_eq!(command_word("brk"), Some(0x0040));
        assert_eq!(command_mnemonic(0x0160), Some("RFI"));
        assert_eq!(register("j"), Some(7));
        assert!(is_reserved("peek"));
        assert!(!is_reserved("loop"));
        assert!(is_conditional(0x10) && is_conditional(0x17) && !is_conditional(0x1a));
    }
}
