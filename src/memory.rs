use serde::{Deserialize, Serialize};

pub const WORDS: usize = 0x10000;

/// Flat 64K-word RAM. Every 16-bit address is valid.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    words: Vec<u16>,
}

impl Memory {
    pub fn new() -> Self {
        Self { words: vec![0; WORDS] }
    }

    pub fn read(&self, addr: u16) -> u16 {
        self.words[addr as usize]
    }

    pub fn write(&mut self, addr: u16, val: u16) {
        self.words[addr as usize] = val;
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Copies `program` to address 0, truncating anything past the top.
    pub fn load(&mut self, program: &[u16]) {
        let len = program.len().min(WORDS);
        self.words[..len].copy_from_slice(&program[..len]);
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.words
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.words.iter().filter(|&&w| w != 0).count();
        f.debug_struct("Memory").field("nonzero", &used).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_truncates_at_top_of_memory() {
        let mut mem = Memory::new();
        mem.load(&vec![7; WORDS + 3]);
        assert_eq!(mem.read(0xffff), 7);
        mem.clear();
        assert!(mem.as_slice().iter().all(|&w| w == 0));
        assert_eq!(format!("{mem:?}"), "Memory { nonzero: 0 }");
    }
}
