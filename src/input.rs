use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crate::interpreter::KEYPAD_KEYS;

/// hex keypad laid over the left-hand side of a qwerty keyboard, matching
/// the original COSMAC arrangement:
///
///   1 2 3 C        1 2 3 4
///   4 5 6 D   <-   q w e r
///   7 8 9 E        a s d f
///   A 0 B F        z x c v
const CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals report no key-up events, so a pressed key counts as held for
/// this long after its last repeat
const KEY_HOLD: Duration = Duration::from_millis(150);

/// session-level requests that are not keypad state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Quit,
    TogglePause,
    Reset,
}

/// Input collaborator: drains host events once per tick and exposes the
/// 16-key down/up snapshot the core reads. Mapping physical keys to nibble
/// indices happens entirely here.
pub trait Input {
    /// drain pending events; returns a control request if one arrived
    fn poll(&mut self) -> Result<Option<Control>, io::Error>;

    /// the current keypad snapshot
    fn keypad(&self) -> [bool; KEYPAD_KEYS];
}

/// reads the terminal via crossterm, in raw mode for its lifetime
pub struct CrosstermInput {
    keymap: HashMap<char, u8>,
    pressed_at: [Option<Instant>; KEYPAD_KEYS],
}

impl CrosstermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(CrosstermInput {
            keymap: HashMap::from(CONVENTIONAL_KEYMAP),
            pressed_at: [None; KEYPAD_KEYS],
        })
    }
}

impl Drop for CrosstermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for CrosstermInput {
    fn poll(&mut self) -> Result<Option<Control>, io::Error> {
        let mut control = None;
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => control = Some(Control::Quit),
                    KeyCode::Char(' ') => control = Some(Control::TogglePause),
                    KeyCode::Char('=') => control = Some(Control::Reset),
                    KeyCode::Char(key) => {
                        if let Some(mapped) = self.keymap.get(&key) {
                            self.pressed_at[*mapped as usize] = Some(Instant::now());
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(control)
    }

    fn keypad(&self) -> [bool; KEYPAD_KEYS] {
        let mut keys = [false; KEYPAD_KEYS];
        for (key, stamp) in keys.iter_mut().zip(self.pressed_at.iter()) {
            *key = matches!(stamp, Some(t) if t.elapsed() < KEY_HOLD);
        }
        keys
    }
}

/// scripted Input implementation for testing
pub struct DummyInput {
    keys: [bool; KEYPAD_KEYS],
    controls: Vec<Control>,
}

impl DummyInput {
    pub fn new(down: &[u8]) -> Self {
        let mut keys = [false; KEYPAD_KEYS];
        for k in down {
            keys[*k as usize] = true;
        }
        DummyInput {
            keys,
            controls: Vec::new(),
        }
    }

    pub fn queue_control(&mut self, c: Control) {
        self.controls.push(c);
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<Option<Control>, io::Error> {
        Ok(if self.controls.is_empty() {
            None
        } else {
            Some(self.controls.remove(0))
        })
    }

    fn keypad(&self) -> [bool; KEYPAD_KEYS] {
        self.keys
    }
}
