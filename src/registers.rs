use crate::error::{Result, VmError};
use crate::memory::PROGRAM_ADDR;

/// V0..VF
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision/shift-out flag
pub const FLAG: usize = 0xF;

/// nesting limit for subroutine calls
pub const STACK_DEPTH: usize = 16;

/// The register file: sixteen 8-bit general registers, the 16-bit index
/// register, the program counter, and the call stack.
///
/// The stack is a fixed 16-slot array behind checked push/pop; the original
/// interpreter walked a raw pointer off either end, which is exactly the
/// corruption these accessors exist to prevent.
pub struct Registers {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    /// save a return address before jumping into a subroutine
    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.sp == STACK_DEPTH {
            return Err(VmError::StackOverflow { depth: STACK_DEPTH });
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    /// take back the most recent return address
    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }
}

impl Default for Registers {
    fn default() -> Self {
        Registers::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pc_starts_at_0x200() {
        let r = Registers::new();
        assert_eq!(r.pc, 0x200);
        assert_eq!(r.i, 0);
        assert_eq!(r.v, [0; 16]);
    }

    #[test]
    fn test_push_pop_is_lifo() {
        let mut r = Registers::new();
        r.push(0x202).unwrap();
        r.push(0x2fe).unwrap();
        assert_eq!(r.depth(), 2);
        assert_eq!(r.pop().unwrap(), 0x2fe);
        assert_eq!(r.pop().unwrap(), 0x202);
        assert_eq!(r.depth(), 0);
    }

    #[test]
    fn test_push_overflows_at_sixteen() {
        let mut r = Registers::new();
        for n in 0..16 {
            r.push(0x200 + n).unwrap();
        }
        assert!(matches!(
            r.push(0x300),
            Err(VmError::StackOverflow { depth: 16 })
        ));
        // the stack itself is untouched by the failed push
        assert_eq!(r.depth(), 16);
        assert_eq!(r.pop().unwrap(), 0x20f);
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut r = Registers::new();
        assert!(matches!(r.pop(), Err(VmError::StackUnderflow)));
    }
}
