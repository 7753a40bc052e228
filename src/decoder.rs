use serde::{Deserialize, Serialize};

pub const OP_MASK: u16 = 0x1f;
pub const DST_SHIFT: u16 = 5;
pub const DST_MASK: u16 = 0x1f;
pub const SRC_SHIFT: u16 = 10;
pub const SRC_MASK: u16 = 0x3f;

/// The three fields of an instruction word:
/// `ssssss ddddd ooooo` = src(15..10) | dst(9..5) | op(4..0).
///
/// For special instructions `op` is zero and `dst` holds the special opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: u8,
    pub dst: u8,
    pub src: u8,
}

impl Decoded {
    pub fn decode(word: u16) -> Self {
        Self {
            op: (word & OP_MASK) as u8,
            dst: ((word >> DST_SHIFT) & DST_MASK) as u8,
            src: ((word >> SRC_SHIFT) & SRC_MASK) as u8,
        }
    }

    pub fn encode(self) -> u16 {
        (self.op as u16 & OP_MASK)
            | ((self.dst as u16 & DST_MASK) << DST_SHIFT)
            | ((self.src as u16 & SRC_MASK) << SRC_SHIFT)
    }

    pub fn is_special(self) -> bool {
        self.op == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_split_and_rejoin() {
        let d = Decoded::decode(0x7fc1);
        assert_eq!(d, Decoded { op: 0x01, dst: 0x1e, src: 0x1f });
        assert_eq!(d.encode(), 0x7fc1);
        assert!(!d.is_special());

        let jsr = Decoded::decode(0x7c20);
        assert!(jsr.is_special());
        assert_eq!(jsr.dst, 0x01);
    }
}
