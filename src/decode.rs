/// The addressing fields of one 16-bit instruction word. Recomputed on
/// every fetch; `decode` is total, so there is nothing here that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub raw: u16,
    /// low 12 bits: address/constant
    pub nnn: u16,
    /// low 8 bits: constant
    pub nn: u8,
    /// low 4 bits: nibble
    pub n: u8,
    /// bits 8-11: first register selector
    pub x: u8,
    /// bits 4-7: second register selector
    pub y: u8,
}

pub fn decode(opcode: u16) -> Instruction {
    Instruction {
        raw: opcode,
        nnn: opcode & 0x0fff,
        nn: (opcode & 0x00ff) as u8,
        n: (opcode & 0x000f) as u8,
        x: ((opcode >> 8) & 0xf) as u8,
        y: ((opcode >> 4) & 0xf) as u8,
    }
}

impl Instruction {
    /// top nibble, selecting one of the sixteen opcode families
    pub fn family(&self) -> u8 {
        ((self.raw >> 12) & 0xf) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extraction() {
        let i = decode(0xd12f);
        assert_eq!(i.raw, 0xd12f);
        assert_eq!(i.family(), 0xd);
        assert_eq!(i.nnn, 0x12f);
        assert_eq!(i.nn, 0x2f);
        assert_eq!(i.n, 0xf);
        assert_eq!(i.x, 0x1);
        assert_eq!(i.y, 0x2);
    }

    #[test]
    fn test_all_zero_and_all_one_words() {
        let z = decode(0x0000);
        assert_eq!((z.family(), z.nnn, z.nn, z.n, z.x, z.y), (0, 0, 0, 0, 0, 0));
        let f = decode(0xffff);
        assert_eq!(
            (f.family(), f.nnn, f.nn, f.n, f.x, f.y),
            (0xf, 0xfff, 0xff, 0xf, 0xf, 0xf)
        );
    }
}
