use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::debug;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// map of characters typed on the host to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard
///   1 2 3 C      1 2 3 4
///   4 5 6 D  =>  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
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

/// which host keys stand in for the hex keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Keymap {
    /// QWERTY block 1234/qwer/asdf/zxcv, laid out like the COSMAC keypad
    #[default]
    Conventional,
    /// type the hex digit itself
    Literal,
}

impl Keymap {
    fn table(self) -> HashMap<char, u8> {
        match self {
            Keymap::Conventional => HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            Keymap::Literal => HashMap::from(CHIP8_LITERAL_KEYMAP),
        }
    }
}

/// terminals only send key-down (and auto-repeat), so a key counts as held
/// until this long after its last event
pub const KEY_HOLD: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(u8),
    Up(u8),
    Quit,
}

/// reads keypresses, already translated into the 0x0-0xf key space
pub trait Input {
    /// everything that happened since the last call
    fn poll_events(&mut self, now: Instant) -> Result<Vec<KeyEvent>, io::Error>;
}

/// Turns a stream of key-down/repeat events into down/up pairs.
#[derive(Default)]
pub struct HeldKeys {
    last_seen: HashMap<u8, Instant>,
}

impl HeldKeys {
    /// true if this is a fresh press rather than a repeat
    pub fn touch(&mut self, key: u8, now: Instant) -> bool {
        self.last_seen.insert(key, now).is_none()
    }

    /// keys not seen for KEY_HOLD, now released
    pub fn expire(&mut self, now: Instant) -> Vec<u8> {
        let mut released: Vec<u8> = self
            .last_seen
            .iter()
            .filter(|&(_, &seen)| now.duration_since(seen) >= KEY_HOLD)
            .map(|(&key, _)| key)
            .collect();
        released.sort_unstable();
        for key in &released {
            self.last_seen.remove(key);
        }
        released
    }
}

/// keyboard in a raw-mode terminal, via crossterm
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: HeldKeys,
}

impl TermInput {
    pub fn new(keymap: Keymap) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: keymap.table(),
            held: HeldKeys::default(),
        })
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll_events(&mut self, now: Instant) -> Result<Vec<KeyEvent>, io::Error> {
        let mut events = Vec::new();
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => events.push(KeyEvent::Quit),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(KeyEvent::Quit)
                    }
                    KeyCode::Char(c) => match self.keymap.get(&c.to_ascii_lowercase()) {
                        Some(&key) => {
                            if self.held.touch(key, now) {
                                events.push(KeyEvent::Down(key));
                            }
                        }
                        None => debug!("can't map {:?} to a COSMAC key", c),
                    },
                    other => debug!("ignoring key {:?}", other),
                },
                other => debug!("ignoring event {:?}", other),
            }
        }
        events.extend(self.held.expire(now).into_iter().map(KeyEvent::Up));
        Ok(events)
    }
}

/// dummy Input implementation for testing; hands out its script in one go
pub struct DummyInput {
    events: Vec<KeyEvent>,
}

impl DummyInput {
    pub fn new(events: &[KeyEvent]) -> Self {
        DummyInput {
            events: Vec::from(events),
        }
    }
}

impl Input for DummyInput {
    fn poll_events(&mut self, _now: Instant) -> Result<Vec<KeyEvent>, io::Error> {
        Ok(std::mem::take(&mut self.events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymaps_cover_every_key() {
        for map in [Keymap::Conventional, Keymap::Literal] {
            let mut keys: Vec<u8> = map.table().into_values().collect();
            keys.sort_unstable();
            assert_eq!(keys, (0..16).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn test_repeat_is_not_a_new_press() {
        let t0 = Instant::now();
        let mut held = HeldKeys::default();
        assert!(held.touch(5, t0));
        assert!(!held.touch(5, t0 + Duration::from_millis(30)));
    }

    #[test]
    fn test_release_after_hold() {
        let t0 = Instant::now();
        let mut held = HeldKeys::default();
        held.touch(5, t0);
        held.touch(9, t0 + Duration::from_millis(100));
        assert!(held.expire(t0 + Duration::from_millis(100)).is_empty());
        assert_eq!(held.expire(t0 + KEY_HOLD), vec![5]);
        assert_eq!(held.expire(t0 + Duration::from_millis(100) + KEY_HOLD), vec![9]);
        // released keys press fresh again
        assert!(held.touch(5, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_dummy_input_drains() -> Result<(), io::Error> {
        let mut i = DummyInput::new(&[KeyEvent::Down(1), KeyEvent::Up(1)]);
        assert_eq!(i.poll_events(Instant::now())?.len(), 2);
        assert!(i.poll_events(Instant::now())?.is_empty());
        Ok(())
    }
}
