use crate::error::{Result, VmError};
use crate::interpreter::{Interpreter, QuirkMode, KEYPAD_KEYS};

/// the tick cadence everything is paced against
pub const TICK_HZ: u32 = 60;

/// default instruction budget per second, as on the original interpreter
pub const DEFAULT_IPS: u32 = 700;

/// Where the session is in its lifecycle. `Halted` is terminal for the
/// loaded program (a stack or memory fault stopped it); only an explicit
/// reset leaves it. Quitting is the embedder's decision, not a state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Halted,
}

/// Paces the interpreter against the 60 Hz tick: runs the per-tick
/// instruction burst, honors the legacy display-wait, then advances the
/// timers. The embedder calls `tick` once per frame and uses the returned
/// tone state to gate the sound collaborator.
pub struct Scheduler {
    interpreter: Interpreter,
    state: RunState,
    budget: u32,
    fault: Option<VmError>,
}

impl Scheduler {
    pub fn new(interpreter: Interpreter, instructions_per_second: u32) -> Self {
        Scheduler {
            interpreter,
            state: RunState::Running,
            // a budget below one instruction per tick would never progress
            budget: (instructions_per_second / TICK_HZ).max(1),
            fault: None,
        }
    }

    /// one 60 Hz tick: instruction burst, then timers; returns whether the
    /// tone should be sounding. Paused and halted machines do nothing.
    pub fn tick(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        for _ in 0..self.budget {
            match self.interpreter.step() {
                Ok(drew) => {
                    // the original hardware spent the rest of the frame
                    // pushing the sprite to the display
                    if drew && self.interpreter.quirks() == QuirkMode::Legacy {
                        break;
                    }
                }
                Err(e) => {
                    self.fault = Some(e);
                    self.state = RunState::Halted;
                    return false;
                }
            }
        }
        self.interpreter.tick_timers()
    }

    /// flip Running <-> Paused; halted machines stay halted
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Halted => RunState::Halted,
        };
    }

    /// re-initialise the machine against its retained program and re-enter
    /// Running, clearing any recorded fault
    pub fn reset(&mut self) {
        self.interpreter.reset();
        self.fault = None;
        self.state = RunState::Running;
    }

    /// hand the framebuffer to the renderer if a redraw is owed
    pub fn take_frame(&mut self) -> Option<&[bool]> {
        let fb = self.interpreter.framebuffer_mut();
        if fb.is_dirty() {
            fb.mark_clean();
            Some(self.interpreter.framebuffer().cells())
        } else {
            None
        }
    }

    pub fn set_keypad(&mut self, keys: [bool; KEYPAD_KEYS]) {
        self.interpreter.set_keypad(keys);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn fault(&self) -> Option<&VmError> {
        self.fault.as_ref()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }
}

/// convenience constructor: validate and load a program, then wrap it in a
/// scheduler at the given pace
pub fn boot(program: &[u8], quirks: QuirkMode, instructions_per_second: u32) -> Result<Scheduler> {
    let interpreter = Interpreter::new(program, quirks)?;
    Ok(Scheduler::new(interpreter, instructions_per_second))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(words: &[u16]) -> Vec<u8> {
        let mut image = Vec::new();
        for w in words {
            image.push((w >> 8) as u8);
            image.push(*w as u8);
        }
        image
    }

    #[test]
    fn test_budget_instructions_per_tick() {
        // V0 counts the instructions executed; jump keeps it looping
        let prog = image(&[0x7001, 0x1200]);
        let mut s = boot(&prog, QuirkMode::Modern, 600).unwrap();
        s.tick();
        // 10 instructions: 5 increments, 5 jumps
        assert_eq!(s.interpreter().pc(), 0x200);
        assert_eq!(s.state(), RunState::Running);
    }

    #[test]
    fn test_budget_never_below_one() {
        let prog = image(&[0x7001, 0x1200]);
        let s = boot(&prog, QuirkMode::Modern, 30).unwrap();
        assert_eq!(s.budget, 1);
    }

    #[test]
    fn test_legacy_draw_ends_the_burst() {
        // draw, then an instruction that must not run this tick
        let prog = image(&[0xa200, 0xd001, 0x6a55, 0x1204]);
        let mut s = boot(&prog, QuirkMode::Legacy, 700).unwrap();
        s.tick();
        // burst stopped right after the draw at 0x202
        assert_eq!(s.interpreter().pc(), 0x204);
    }

    #[test]
    fn test_modern_draw_does_not_pace() {
        let prog = image(&[0xa200, 0xd001, 0x6a55, 0x1204]);
        let mut s = boot(&prog, QuirkMode::Modern, 700).unwrap();
        s.tick();
        // all 11 budgeted instructions ran, spinning on the tail jump
        assert_ne!(s.interpreter().pc(), 0x204);
    }

    #[test]
    fn test_tone_follows_sound_timer() {
        // sound timer = 3, then spin
        let prog = image(&[0x6a03, 0xfa18, 0x1204]);
        let mut s = boot(&prog, QuirkMode::Modern, 60).unwrap();
        assert!(!s.tick()); // 0x6a03
        assert!(s.tick()); // 0xfa18 sets it to 3, the tick leaves 2
        assert!(s.tick()); // 1
        assert!(!s.tick()); // 0
        assert!(!s.tick());
    }

    #[test]
    fn test_pause_gates_execution_and_timers() {
        // sound timer = 200, then spin; the timer is the progress marker
        let prog = image(&[0x6ac8, 0xfa18, 0x1204]);
        let mut s = boot(&prog, QuirkMode::Modern, 120).unwrap();
        s.tick();
        assert_eq!(s.interpreter().sound_timer(), 199);
        s.toggle_pause();
        assert_eq!(s.state(), RunState::Paused);
        for _ in 0..10 {
            assert!(!s.tick());
        }
        assert_eq!(s.interpreter().sound_timer(), 199);
        s.toggle_pause();
        assert_eq!(s.state(), RunState::Running);
        s.tick();
        assert_eq!(s.interpreter().sound_timer(), 198);
    }

    #[test]
    fn test_fault_halts_with_cause() {
        // return with nothing on the stack
        let prog = image(&[0x00ee]);
        let mut s = boot(&prog, QuirkMode::Modern, 700).unwrap();
        assert!(!s.tick());
        assert_eq!(s.state(), RunState::Halted);
        assert!(matches!(s.fault(), Some(VmError::StackUnderflow)));
        // halted machines ignore further ticks and pause toggles
        s.tick();
        s.toggle_pause();
        assert_eq!(s.state(), RunState::Halted);
    }

    #[test]
    fn test_reset_recovers_from_halt() {
        let prog = image(&[0x00ee]);
        let mut s = boot(&prog, QuirkMode::Modern, 700).unwrap();
        s.tick();
        assert_eq!(s.state(), RunState::Halted);
        s.reset();
        assert_eq!(s.state(), RunState::Running);
        assert!(s.fault().is_none());
        assert_eq!(s.interpreter().pc(), 0x200);
    }

    #[test]
    fn test_take_frame_only_when_dirty() {
        let prog = image(&[0xa200, 0xd001, 0x1204]);
        let mut s = boot(&prog, QuirkMode::Modern, 180).unwrap();
        s.tick();
        assert!(s.take_frame().is_some());
        assert!(s.take_frame().is_none()); // nothing new to present
    }
}
