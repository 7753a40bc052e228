use anyhow::Result;
use std::path::Path;

use dcpu16::object;

/// A raw word image loaded from disk.
#[derive(Debug, Clone)]
pub struct Image {
    pub base: u16,
    pub words: Vec<u16>,
}

impl Image {
    pub fn from_bytes(bytes: &[u8], base: u16, skip: usize, len: Option<usize>) -> Result<Self> {
        anyhow::ensure!(skip <= bytes.len(), "--skip exceeds file size");
        let mut payload = &bytes[skip..];
        if let Some(lim) = len {
            anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
            payload = &payload[..lim];
        }
        Ok(Self { base, words: object::from_bytes(payload) })
    }

    pub fn read(&self, addr: u16) -> Option<u16> {
        let off = addr.wrapping_sub(self.base) as usize;
        self.words.get(off).copied()
    }

    /// Words from `start` up to (not including) `end`, clipped to the image.
    pub fn slice(&self, start: u16, end: u16) -> &[u16] {
        let lo = (start.wrapping_sub(self.base) as usize).min(self.words.len());
        let hi = (end.wrapping_sub(self.base) as usize).clamp(lo, self.words.len());
        &self.words[lo..hi]
    }
}

/// Loads a big-endian word image. `skip` and `len` are in bytes.
pub fn load_image(path: &Path, base: u16, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    Image::from_bytes(&file, base, skip, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loader_maps_skip_and_len() {
        let img = Image::from_bytes(&[0xff, 0xff, 0x7c, 0x01, 0x00, 0x30, 0xaa], 0x1000, 2, Some(4)).unwrap();
        assert_eq!(img.words, vec![0x7c01, 0x0030]);
        assert_eq!(img.read(0x1001), Some(0x0030));
        assert_eq!(img.read(0x1002), None);
        assert_eq!(img.slice(0x1000, 0x1001), &[0x7c01]);
    }

    #[test]
    fn loader_rejects_bad_skip() {
        assert!(Image::from_bytes(&[0, 1], 0, 3, None).is_err());
    }
}
