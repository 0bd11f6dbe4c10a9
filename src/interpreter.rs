use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::decode::{decode, Instruction};
use crate::error::Result;
use crate::framebuffer::FrameBuffer;
use crate::memory::{Memory, GLYPH_BYTES};
use crate::registers::{Registers, FLAG};

/// number of keys on the hex keypad
pub const KEYPAD_KEYS: usize = 16;

/// Which historical interpreter lineage the opcode semantics follow.
///
/// `Legacy` is the original COSMAC VIP behavior: shifts read VY, register
/// dump/load walk the index register, and the scheduler waits for the
/// display after a draw. `Modern` is the SCHIP-descended variant. `Extended`
/// is reserved for XO-CHIP-style additions and currently behaves exactly
/// like `Modern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuirkMode {
    Legacy,
    Modern,
    Extended,
}

impl QuirkMode {
    fn shifts_read_vy(self) -> bool {
        self == QuirkMode::Legacy
    }

    fn dump_load_walk_index(self) -> bool {
        self == QuirkMode::Legacy
    }
}

/// The fetch/decode/execute engine and the machine state it mutates:
/// memory, registers, call stack, framebuffer, timers and keypad.
///
/// One `step` fetches the word at PC, advances PC by 2, then applies the
/// opcode's effects; jump and call opcodes therefore see the address of the
/// *next* instruction when they save or overwrite PC.
pub struct Interpreter {
    memory: Memory,
    regs: Registers,
    framebuffer: FrameBuffer,
    keypad: [bool; KEYPAD_KEYS],
    delay_timer: u8,
    sound_timer: u8,
    quirks: QuirkMode,
    rng: StdRng,
    // retained so reset() can re-initialise without re-reading the file
    program: Vec<u8>,
    unknown_opcodes: u32,
    last_unknown: Option<u16>,
}

impl Interpreter {
    /// validate and load a program image; fails before any session state
    /// exists if the image does not fit above 0x200
    pub fn new(program: &[u8], quirks: QuirkMode) -> Result<Self> {
        let mut memory = Memory::new();
        memory.load_program(program)?;
        Ok(Interpreter {
            memory,
            regs: Registers::new(),
            framebuffer: FrameBuffer::new(),
            keypad: [false; KEYPAD_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            quirks,
            rng: StdRng::from_entropy(),
            program: program.to_vec(),
            unknown_opcodes: 0,
            last_unknown: None,
        })
    }

    /// re-run initialisation against the retained program image
    pub fn reset(&mut self) {
        self.memory = Memory::new();
        // the image fit at construction time, so it still fits
        let _ = self.memory.load_program(&self.program);
        self.regs = Registers::new();
        self.framebuffer = FrameBuffer::new();
        self.keypad = [false; KEYPAD_KEYS];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.unknown_opcodes = 0;
        self.last_unknown = None;
    }

    /// fetch, decode and execute one instruction; reports whether it was a
    /// draw, which the scheduler uses for the legacy display-wait
    pub fn step(&mut self) -> Result<bool> {
        let opcode = self.memory.read_word(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(2);
        let inst = decode(opcode);

        let mut drew = false;
        match inst.family() {
            0x0 => match inst.nn {
                0xe0 => self.framebuffer.clear(),
                0xee => self.regs.pc = self.regs.pop()?,
                // 0NNN machine-code calls never ran on anything but a VIP
                _ => self.note_unknown(inst.raw),
            },
            0x1 => self.regs.pc = inst.nnn,
            0x2 => {
                self.regs.push(self.regs.pc)?;
                self.regs.pc = inst.nnn;
            }
            0x3 => {
                if self.regs.v[inst.x as usize] == inst.nn {
                    self.skip();
                }
            }
            0x4 => {
                if self.regs.v[inst.x as usize] != inst.nn {
                    self.skip();
                }
            }
            0x5 => match inst.n {
                0 => {
                    if self.regs.v[inst.x as usize] == self.regs.v[inst.y as usize] {
                        self.skip();
                    }
                }
                _ => self.note_unknown(inst.raw),
            },
            0x6 => self.regs.v[inst.x as usize] = inst.nn,
            0x7 => {
                let vx = &mut self.regs.v[inst.x as usize];
                *vx = vx.wrapping_add(inst.nn);
            }
            0x8 => self.exec_alu(&inst),
            0x9 => {
                if self.regs.v[inst.x as usize] != self.regs.v[inst.y as usize] {
                    self.skip();
                }
            }
            0xa => self.regs.i = inst.nnn,
            0xb => self.regs.pc = self.regs.v[0] as u16 + inst.nnn,
            0xc => self.regs.v[inst.x as usize] = self.rng.gen::<u8>() & inst.nn,
            0xd => {
                self.exec_draw(&inst)?;
                drew = true;
            }
            0xe => {
                // only the low nibble of VX can name a key
                let key = (self.regs.v[inst.x as usize] & 0xf) as usize;
                match inst.nn {
                    0x9e => {
                        if self.keypad[key] {
                            self.skip();
                        }
                    }
                    0xa1 => {
                        if !self.keypad[key] {
                            self.skip();
                        }
                    }
                    _ => self.note_unknown(inst.raw),
                }
            }
            0xf => self.exec_misc(&inst)?,
            _ => unreachable!("family is a 4-bit value"),
        }
        Ok(drew)
    }

    /// the 8XYn arithmetic/logic family
    fn exec_alu(&mut self, inst: &Instruction) {
        let x = inst.x as usize;
        let y = inst.y as usize;
        match inst.n {
            0x0 => self.regs.v[x] = self.regs.v[y],
            0x1 => {
                self.regs.v[x] |= self.regs.v[y];
                // the VIP interpreter trashed VF on the logical ops; kept
                // unconditional to match the reference behavior
                self.regs.v[FLAG] = 0;
            }
            0x2 => {
                self.regs.v[x] &= self.regs.v[y];
                self.regs.v[FLAG] = 0;
            }
            0x3 => {
                self.regs.v[x] ^= self.regs.v[y];
                self.regs.v[FLAG] = 0;
            }
            0x4 => {
                let (sum, carry) = self.regs.v[x].overflowing_add(self.regs.v[y]);
                self.regs.v[x] = sum;
                self.regs.v[FLAG] = carry as u8;
            }
            0x5 => {
                let no_borrow = self.regs.v[x] >= self.regs.v[y];
                self.regs.v[x] = self.regs.v[x].wrapping_sub(self.regs.v[y]);
                self.regs.v[FLAG] = no_borrow as u8;
            }
            0x6 => {
                let src = if self.quirks.shifts_read_vy() {
                    self.regs.v[y]
                } else {
                    self.regs.v[x]
                };
                self.regs.v[x] = src >> 1;
                self.regs.v[FLAG] = src & 1;
            }
            0x7 => {
                let no_borrow = self.regs.v[y] >= self.regs.v[x];
                self.regs.v[x] = self.regs.v[y].wrapping_sub(self.regs.v[x]);
                self.regs.v[FLAG] = no_borrow as u8;
            }
            0xe => {
                let src = if self.quirks.shifts_read_vy() {
                    self.regs.v[y]
                } else {
                    self.regs.v[x]
                };
                self.regs.v[x] = src << 1;
                self.regs.v[FLAG] = src >> 7;
            }
            _ => self.note_unknown(inst.raw),
        }
    }

    /// DXYN: XOR an N-row sprite from memory[I..] at (VX, VY)
    fn exec_draw(&mut self, inst: &Instruction) -> Result<()> {
        let x = self.regs.v[inst.x as usize] as usize;
        let y = self.regs.v[inst.y as usize] as usize;
        self.regs.v[FLAG] = 0;
        let mut collision = false;
        for row in 0..inst.n as usize {
            let bits = self.memory.read(self.regs.i as usize + row)?;
            collision |= self.framebuffer.xor_row(x, y + row, bits);
        }
        if collision {
            self.regs.v[FLAG] = 1;
        }
        Ok(())
    }

    /// the FXnn family: timers, keypad wait, index arithmetic, BCD,
    /// register dump/load
    fn exec_misc(&mut self, inst: &Instruction) -> Result<()> {
        let x = inst.x as usize;
        match inst.nn {
            0x07 => self.regs.v[x] = self.delay_timer,
            0x0a => match self.keypad.iter().position(|k| *k) {
                Some(key) => self.regs.v[x] = key as u8,
                // rewind so the same instruction re-runs next cycle; the
                // timers keep going while we wait
                None => self.regs.pc = self.regs.pc.wrapping_sub(2),
            },
            0x15 => self.delay_timer = self.regs.v[x],
            0x18 => self.sound_timer = self.regs.v[x],
            0x1e => self.regs.i = self.regs.i.wrapping_add(self.regs.v[x] as u16),
            0x29 => self.regs.i = self.regs.v[x] as u16 * GLYPH_BYTES,
            0x33 => {
                let value = self.regs.v[x];
                let i = self.regs.i as usize;
                self.memory.write(i, value / 100)?;
                self.memory.write(i + 1, value / 10 % 10)?;
                self.memory.write(i + 2, value % 10)?;
            }
            0x55 => {
                for r in 0..=x {
                    if self.quirks.dump_load_walk_index() {
                        self.memory.write(self.regs.i as usize, self.regs.v[r])?;
                        self.regs.i = self.regs.i.wrapping_add(1);
                    } else {
                        self.memory.write(self.regs.i as usize + r, self.regs.v[r])?;
                    }
                }
            }
            0x65 => {
                for r in 0..=x {
                    if self.quirks.dump_load_walk_index() {
                        self.regs.v[r] = self.memory.read(self.regs.i as usize)?;
                        self.regs.i = self.regs.i.wrapping_add(1);
                    } else {
                        self.regs.v[r] = self.memory.read(self.regs.i as usize + r)?;
                    }
                }
            }
            _ => self.note_unknown(inst.raw),
        }
        Ok(())
    }

    fn skip(&mut self) {
        self.regs.pc = self.regs.pc.wrapping_add(2);
    }

    /// tolerant-unknown-opcode policy: record and carry on
    fn note_unknown(&mut self, opcode: u16) {
        self.unknown_opcodes += 1;
        self.last_unknown = Some(opcode);
    }

    /// advance both timers one 60 Hz tick; returns whether the tone
    /// should be sounding
    pub fn tick_timers(&mut self) -> bool {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
        self.sound_timer > 0
    }

    /// replace the keypad snapshot; called once per tick by the input
    /// collaborator
    pub fn set_keypad(&mut self, keys: [bool; KEYPAD_KEYS]) {
        self.keypad = keys;
    }

    pub fn quirks(&self) -> QuirkMode {
        self.quirks
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn unknown_opcodes(&self) -> u32 {
        self.unknown_opcodes
    }

    pub fn last_unknown(&self) -> Option<u16> {
        self.last_unknown
    }
}
