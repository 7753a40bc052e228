use dcpu16::{assemble, disassemble, parse_program};
use pretty_assertions::assert_eq;

const SOURCE: &str = "\
; copies a countdown into memory
:main SET A, 0x1000
      SET [A + 2], 0xbeef
:.loop IFN [A + 2], 0
         SUB [A + 2], 1
      IFG 0x20, B
      SET PC, .loop
      JSR sub
      BRK
:sub  SET PUSH, X
      SET X, POP
      SET PC, POP
:msg  DAT \"ok\", 0, msg
      RESERVE 2
";

#[test]
fn pretty_listing_reassembles_to_the_same_words() {
    let prog = parse_program(SOURCE).unwrap();
    let listing = prog.pretty();
    let again = parse_program(&listing).unwrap();
    assert_eq!(again.encode().unwrap(), prog.encode().unwrap());
    assert_eq!(again.pretty(), listing);
}

#[test]
fn pretty_listing_layout() {
    let prog = parse_program("IFE A, 1\nSET B, 0x30\n:x BRK").unwrap();
    let listing = prog.pretty();
    let rows: Vec<&str> = listing.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("  IFE A, 1"));
    assert!(rows[0].ends_with("; 8812"));
    assert!(rows[1].starts_with("    SET B, 48"));
    assert!(rows[1].ends_with("; 7c21 0030"));
    assert_eq!(rows[2], ":x");
    assert!(rows[3].starts_with("  BRK"));
}

struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> u16 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x >> 8) as u16
    }
}

#[test]
fn any_word_stream_survives_disassembly() {
    let mut rng = XorShift(0x2545_f491);
    for len in 0..200 {
        let words: Vec<u16> = (0..len % 24).map(|_| rng.next()).collect();
        let prog = disassemble(&words);
        assert_eq!(prog.size(), words.len());
        assert_eq!(prog.encode().unwrap(), words, "stream {words:04x?}");
    }
}

#[test]
fn disassembly_of_assembled_code_reassembles() {
    let words = assemble("SET [0x1000], 0x20\nADD A, [B + 0x100]\nIFE X, 7\nJSR 0x4000\nSET A, POP").unwrap();
    let listing = disassemble(&words).pretty();
    assert_eq!(assemble(&listing).unwrap(), words);
}

#[test]
fn low_label_as_source_keeps_its_trailing_word() {
    let words = assemble("SET PC, loop\n:loop SET A, 1").unwrap();
    assert_eq!(words, vec![0x7f81, 0x0002, 0x8801]);
    let listing = disassemble(&words).pretty();
    assert!(listing.contains("SET PC, LONG 2"));
    assert_eq!(assemble(&listing).unwrap(), words);
}

#[test]
fn low_label_as_destination_keeps_its_trailing_word() {
    let words = assemble(":here SET here, A").unwrap();
    assert_eq!(words, vec![0x03e1, 0x0000]);
    let listing = disassemble(&words).pretty();
    assert!(listing.contains("SET LONG 0, A"));
    assert_eq!(assemble(&listing).unwrap(), words);
}

#[test]
fn long_minus_one_survives() {
    let words = vec![0x7c01, 0xffff, 0x7fc1, 0x001e, 0x0000];
    let listing = disassemble(&words).pretty();
    assert_eq!(assemble(&listing).unwrap(), words);
}

#[test]
fn fixed_address_label_survives_listing() {
    let src = ":screen @ 0x8000\n:top SET [screen], 0x41\nSET PC, top";
    let prog = parse_program(src).unwrap();
    let listing = prog.pretty();
    assert!(listing.starts_with(":screen @ 0x8000"));
    assert_eq!(assemble(&listing).unwrap(), prog.encode().unwrap());
}
