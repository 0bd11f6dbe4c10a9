use beep::beep;
use std::error::Error;

/// Audio collaborator: the core only decides whether the tone should be
/// sounding (`sound_timer > 0`); pitch and device handling live out here.
pub trait Sound {
    fn set_enabled(&mut self, on: bool) -> Result<(), Box<dyn Error>>;
}

/// middle-ish C, squarely in PC-speaker territory
pub const DEFAULT_PITCH: u16 = 2093;

/// drives the host beeper; remembers its state to avoid re-issuing the
/// same tone every tick
pub struct SimpleBeep {
    pitch: u16,
    on: bool,
}

impl SimpleBeep {
    pub fn new(pitch: u16) -> Self {
        SimpleBeep { pitch, on: false }
    }
}

impl Sound for SimpleBeep {
    fn set_enabled(&mut self, on: bool) -> Result<(), Box<dyn Error>> {
        if on != self.on {
            beep(if on { self.pitch } else { 0 })?;
            self.on = on;
        }
        Ok(())
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        if self.on {
            let _ = beep(0);
        }
    }
}

/// no-op device for machines without a beeper, and for tests
pub struct Mute {
    pub enabled: bool,
}

impl Mute {
    pub fn new() -> Self {
        Mute { enabled: false }
    }
}

impl Default for Mute {
    fn default() -> Self {
        Mute::new()
    }
}

impl Sound for Mute {
    fn set_enabled(&mut self, on: bool) -> Result<(), Box<dyn Error>> {
        self.enabled = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_tracks_state() {
        let mut m = Mute::new();
        assert!(!m.enabled);
        m.set_enabled(true).unwrap();
        assert!(m.enabled);
        m.set_enabled(false).unwrap();
        assert!(!m.enabled);
    }
}
