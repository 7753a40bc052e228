use dcpu16::disasm::{decode_at, fmt_words};
use dcpu16::operand::Immediate;
use dcpu16::{disassemble, Instruction};
use pretty_assertions::assert_eq;

fn lines(words: &[u16]) -> Vec<String> {
    disassemble(words).instructions().map(|i| i.to_string()).collect()
}

#[test]
fn basic_forms() {
    assert_eq!(lines(&[0x7c01, 0x0030]), vec!["SET A, 48"]);
    assert_eq!(lines(&[0x7fc1, 0x0020, 0x1000]), vec!["SET [0x1000], 32"]);
    assert_eq!(lines(&[0x9801, 0x8001]), vec!["SET A, 5", "SET A, 0xffff"]);
    assert_eq!(lines(&[0x6001, 0x0301]), vec!["SET A, POP", "SET PUSH, A"]);
    assert_eq!(lines(&[0x4401, 4, 0x6801, 2]), vec!["SET A, [B + 4]", "SET A, PICK 2"]);
    assert_eq!(lines(&[0x7761, 0x0de2]), vec!["SET SP, EX", "ADD [J], X"]);
}

#[test]
fn special_forms() {
    assert_eq!(lines(&[0x7c20, 0x1234]), vec!["JSR 0x1234"]);
    assert_eq!(lines(&[0x9100, 0x0040]), vec!["INT 3", "BRK A"]);
}

#[test]
fn source_word_precedes_destination_word() {
    let (ins, used) = decode_at(0x7fc1, &[0x0020, 0x1000]).unwrap();
    assert_eq!(used, 2);
    match ins {
        Instruction::Basic { dst, src, .. } => {
            assert_eq!(src.word, Some(Immediate::Value(0x0020)));
            assert_eq!(dst.word, Some(Immediate::Value(0x1000)));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn literal_destination_disassembles() {
    assert_eq!(lines(&[0x03e1, 0x0040]), vec!["SET 64, A"]);
}

#[test]
fn unknown_words_become_data() {
    assert_eq!(lines(&[0x0000]), vec!["DAT 0"]);
    assert_eq!(lines(&[0x0018, 0x9801]), vec!["DAT 24", "SET A, 5"]);
    assert_eq!(lines(&[0x01e0]), vec!["DAT 0x01e0"]);
}

#[test]
fn truncated_instruction_becomes_data() {
    assert_eq!(lines(&[0x7c01]), vec!["DAT 0x7c01"]);
    assert_eq!(lines(&[0x9801, 0x7fc1, 0x0020]), vec!["SET A, 5", "DAT 0x7fc1", "JSR A"]);
    assert!(decode_at(0x7fc1, &[0x0020]).is_none());
}

#[test]
fn offsets_track_word_positions() {
    let prog = disassemble(&[0x9801, 0x7c01, 0x0030, 0x0000]);
    let offsets: Vec<u16> = prog.items().iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![0, 1, 3]);
    assert_eq!(prog.size(), 4);
    assert!(prog.symbols().is_empty());
}

#[test]
fn single_line_rendering() {
    assert_eq!(fmt_words(&[0x7c01, 0x0030, 0xffff]), "SET A, 48");
    assert_eq!(fmt_words(&[0x7c01]), "DAT 0x7c01");
    assert_eq!(fmt_words(&[]), "");
}

#[test]
fn small_trailing_literals_use_long() {
    assert_eq!(lines(&[0x7c01, 0x0005]), vec!["SET A, LONG 5"]);
    assert_eq!(lines(&[0x7c01, 0xffff]), vec!["SET A, LONG 0xffff"]);
    assert_eq!(lines(&[0x03e1, 0x001e]), vec!["SET LONG 30, A"]);
    assert_eq!(lines(&[0x7c01, 0x001f]), vec!["SET A, 31"]);
}
