use crate::config::Config;
use crate::display::{FrameView, Framebuffer};
use crate::error::{Chip8Error, Fault, Result};
use crate::instruction::{Instruction, Register};
use crate::interpreter::{Chip8Interpreter, Peripherals};
use crate::keypad::Keypad;
use crate::memory::Chip8MemoryMap;
use crate::random::{RandomSource, StdRandom};
use log::{debug, warn};
use std::time::Duration;

/// A loaded CHIP-8 program and everything it runs on.
///
/// The host drives it from one place: forward elapsed time with [`run`],
/// tick the timers at 60Hz with [`advance_timers`], forward key events, and
/// redraw when [`display_changed`] says so. Loading another program means
/// building another machine.
///
/// Once an instruction faults the machine is halted for good; `run` keeps
/// reporting the fault and executes nothing.
///
/// [`run`]: VirtualMachine::run
/// [`advance_timers`]: VirtualMachine::advance_timers
/// [`display_changed`]: VirtualMachine::display_changed
pub struct VirtualMachine {
    cpu: Chip8Interpreter,
    memory: Chip8MemoryMap,
    display: Framebuffer,
    keypad: Keypad,
    random: Box<dyn RandomSource>,
    config: Config,
    /// fraction of an instruction owed from earlier `run` calls
    carry: f64,
    halted: Option<Fault>,
}

impl VirtualMachine {
    /// load `rom` at 0x200 with the default config
    pub fn new(rom: &[u8]) -> Result<Self> {
        Self::with_config(rom, Config::default())
    }

    pub fn with_config(rom: &[u8], config: Config) -> Result<Self> {
        let random: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(StdRandom::seeded(seed)),
            None => Box::new(StdRandom::from_entropy()),
        };
        Self::with_random(rom, config, random)
    }

    /// as [`with_config`](Self::with_config), with a caller-supplied source
    /// for the random-byte instruction
    pub fn with_random(rom: &[u8], config: Config, random: Box<dyn RandomSource>) -> Result<Self> {
        if !config.instructions_per_second.is_finite() || config.instructions_per_second <= 0.0 {
            return Err(Chip8Error::InvalidRate(config.instructions_per_second));
        }
        let memory = Chip8MemoryMap::with_program(rom)?;
        debug!(
            "loaded {} byte program at 0x200; {} instructions/s, {:?}",
            rom.len(),
            config.instructions_per_second,
            config.quirks
        );
        Ok(VirtualMachine {
            cpu: Chip8Interpreter::new(config.quirks),
            memory,
            display: Framebuffer::new(),
            keypad: Keypad::new(),
            random,
            config,
            carry: 0.0,
            halted: None,
        })
    }

    pub fn press_key(&mut self, key: u8) -> Result<()> {
        self.keypad.press(key)
    }

    pub fn release_key(&mut self, key: u8) -> Result<()> {
        self.keypad.release(key)
    }

    /// decrement both timers by one, stopping at zero
    pub fn advance_timers(&mut self) {
        self.cpu.tick_timers();
    }

    /// Execute as many instructions as `elapsed` is worth at the configured
    /// rate. The fractional remainder carries over to the next call. Returns
    /// how many instructions ran.
    pub fn run(&mut self, elapsed: Duration) -> Result<usize> {
        if let Some(fault) = self.halted {
            return Err(Chip8Error::Halted(fault));
        }
        let owed = self.carry + elapsed.as_secs_f64() * self.config.instructions_per_second;
        let count = owed.floor();
        self.carry = owed - count;

        let count = count as usize;
        for done in 0..count {
            if let Err(e) = self.step() {
                debug!("stopped after {} of {} instructions", done, count);
                self.carry = 0.0;
                return Err(e);
            }
        }
        Ok(count)
    }

    /// execute exactly one instruction
    pub fn step(&mut self) -> Result<Instruction> {
        if let Some(fault) = self.halted {
            return Err(Chip8Error::Halted(fault));
        }
        let mut p = Peripherals {
            memory: &mut self.memory,
            display: &mut self.display,
            keypad: &mut self.keypad,
            random: self.random.as_mut(),
        };
        self.cpu.step(&mut p).map_err(|fault| {
            warn!("halting: {}", fault);
            self.halted = Some(fault);
            Chip8Error::Fault(fault)
        })
    }

    /// true if the screen changed since the last call
    pub fn display_changed(&mut self) -> bool {
        self.display.consume_dirty()
    }

    pub fn framebuffer_view(&self) -> FrameView<'_> {
        self.display.view()
    }

    pub fn delay_timer_value(&self) -> u8 {
        self.cpu.timers().delay
    }

    pub fn sound_timer_value(&self) -> u8 {
        self.cpu.timers().sound
    }

    pub fn program_counter(&self) -> u16 {
        self.cpu.program_counter()
    }

    pub fn index_register(&self) -> u16 {
        self.cpu.index()
    }

    pub fn register(&self, x: Register) -> u8 {
        self.cpu.register(x)
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.cpu.is_waiting_for_key()
    }

    pub fn halted(&self) -> Option<Fault> {
        self.halted
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
