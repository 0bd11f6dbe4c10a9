use crate::error::{Result, VmError};

// NB. the program counter and index register are u16 as per the chip-8;
//     accessors take usize so callers can do address arithmetic without
//     endless casting

/// how much RAM we have
pub const MEMORY_SIZE: usize = 4096;

/// where programs are loaded and where the PC starts
pub const PROGRAM_ADDR: u16 = 0x200;

/// the largest program that fits between 0x200 and the end of RAM
pub const PROGRAM_CAPACITY: usize = MEMORY_SIZE - PROGRAM_ADDR as usize;

/// each font glyph is five bytes tall; the table lives at 0x000
pub const GLYPH_BYTES: u16 = 5;

/// Flat 4K byte store with the glyph table baked in below 0x050.
///
/// Every access is bounds-checked and surfaces `MemoryFault` rather than
/// wrapping or masking, so a runaway index register stops the program
/// instead of silently reading interpreter internals.
pub struct Memory {
    bytes: Box<[u8; MEMORY_SIZE]>,
}

impl Memory {
    pub fn new() -> Self {
        let mut m = Memory {
            bytes: Box::new([0u8; MEMORY_SIZE]),
        };
        m.bytes[..FONT.len()].copy_from_slice(&FONT);
        m
    }

    /// copy a program image to 0x200, leaving the rest of RAM zeroed
    pub fn load_program(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > PROGRAM_CAPACITY {
            return Err(VmError::ProgramTooLarge {
                len: image.len(),
                max: PROGRAM_CAPACITY,
            });
        }
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn read(&self, addr: usize) -> Result<u8> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(VmError::MemoryFault { addr })
    }

    pub fn write(&mut self, addr: usize, value: u8) -> Result<()> {
        match self.bytes.get_mut(addr) {
            Some(b) => {
                *b = value;
                Ok(())
            }
            None => Err(VmError::MemoryFault { addr }),
        }
    }

    /// big-endian two-byte fetch, used for instruction words
    pub fn read_word(&self, addr: u16) -> Result<u16> {
        let hi = self.read(addr as usize)?;
        let lo = self.read(addr as usize + 1)?;
        Ok(((hi as u16) << 8) | lo as u16)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

/// 16 glyphs, 0-F, five bytes each, at address zero
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_at_zero() {
        let m = Memory::new();
        assert_eq!(m.read(0).unwrap(), 0xF0);
        assert_eq!(m.read(0x4f).unwrap(), 0x80);
        // nothing past the font until the program area
        assert_eq!(m.read(0x50).unwrap(), 0x00);
    }

    #[test]
    fn test_program_load_places_bytes_at_0x200() {
        let mut m = Memory::new();
        let image: Vec<u8> = (0..=255).collect();
        m.load_program(&image).unwrap();
        for (k, b) in image.iter().enumerate() {
            assert_eq!(m.read(0x200 + k).unwrap(), *b);
        }
    }

    #[test]
    fn test_program_load_max_size_ok() {
        let mut m = Memory::new();
        let image = vec![0xAB; PROGRAM_CAPACITY];
        m.load_program(&image).unwrap();
        assert_eq!(m.read(0x200).unwrap(), 0xAB);
        assert_eq!(m.read(MEMORY_SIZE - 1).unwrap(), 0xAB);
    }

    #[test]
    fn test_program_load_too_large() {
        let mut m = Memory::new();
        let image = vec![0u8; PROGRAM_CAPACITY + 1];
        match m.load_program(&image) {
            Err(VmError::ProgramTooLarge { len, max }) => {
                assert_eq!(len, 3585);
                assert_eq!(max, 3584);
            }
            other => panic!("expected ProgramTooLarge, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_read_out_of_range_faults() {
        let m = Memory::new();
        assert!(matches!(
            m.read(MEMORY_SIZE),
            Err(VmError::MemoryFault { addr: 4096 })
        ));
    }

    #[test]
    fn test_write_out_of_range_faults() {
        let mut m = Memory::new();
        assert!(m.write(MEMORY_SIZE - 1, 1).is_ok());
        assert!(m.write(MEMORY_SIZE, 1).is_err());
    }

    #[test]
    fn test_word_fetch_big_endian() {
        let mut m = Memory::new();
        m.load_program(&[0x12, 0x34]).unwrap();
        assert_eq!(m.read_word(0x200).unwrap(), 0x1234);
    }

    #[test]
    fn test_word_fetch_at_end_of_ram_faults() {
        let m = Memory::new();
        assert!(m.read_word(0x0fff).is_err());
    }
}
