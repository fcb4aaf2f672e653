use crate::error::{Chip8Error, Result};

pub const KEY_COUNT: usize = 16;

/// The 16-key hex keypad. Each key is a latch: last event wins, nothing is
/// queued. Separately, the first released->pressed edge since
/// [`Keypad::arm_capture`] is remembered for the key-wait instruction.
#[derive(Debug, Default)]
pub struct Keypad {
    latches: [bool; KEY_COUNT],
    captured: Option<u8>,
}

fn check(key: u8) -> Result<usize> {
    if (key as usize) < KEY_COUNT {
        Ok(key as usize)
    } else {
        Err(Chip8Error::InvalidKey(key))
    }
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: u8) -> Result<()> {
        let k = check(key)?;
        if !self.latches[k] && self.captured.is_none() {
            self.captured = Some(key);
        }
        self.latches[k] = true;
        Ok(())
    }

    pub fn release(&mut self, key: u8) -> Result<()> {
        let k = check(key)?;
        self.latches[k] = false;
        Ok(())
    }

    /// false for anything outside 0x0-0xf; programs can ask about any value
    pub fn is_pressed(&self, key: u8) -> bool {
        self.latches.get(key as usize).copied().unwrap_or(false)
    }

    /// forget any earlier edge; the next press will be captured
    pub fn arm_capture(&mut self) {
        self.captured = None;
    }

    pub fn take_capture(&mut self) -> Option<u8> {
        self.captured.take()
    }
}
