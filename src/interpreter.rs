//! # interpreter
//!
//! Machine state the program can see but not address:
//!  V0-VF. 8bit general registers; VF doubles as carry/borrow/collision flag
//!  I.     16bit index register
//!  PC.    program counter                      -- 0x200
//!  stack. 16 return addresses
//!  DT/ST. delay and sound timers, ticked at 60Hz by the host
//!
//! fetch reads the big-endian word at PC and moves PC on by 2 *before*
//! executing; skips add another 2, jumps/calls/returns overwrite it. a faulting
//! instruction leaves PC on itself and commits nothing.

use crate::config::{JumpQuirk, LoadStoreQuirk, Quirks, ShiftQuirk};
use crate::display::Framebuffer;
use crate::error::Fault;
use crate::instruction::{Address, Instruction, Register};
use crate::keypad::Keypad;
use crate::memory::{Chip8MemoryMap, MemoryMap, CHIP8_PROGRAM_ADDR, CHIP8_RAM_SIZE_BYTES};
use crate::random::RandomSource;
use crate::timer::Timers;
use log::{debug, trace};

pub const STACK_DEPTH: usize = 16;
const FLAG: usize = 0xf;

/// Everything the CPU reaches through while executing, borrowed for one step.
pub struct Peripherals<'a> {
    pub memory: &'a mut Chip8MemoryMap,
    pub display: &'a mut Framebuffer,
    pub keypad: &'a mut Keypad,
    pub random: &'a mut dyn RandomSource,
}

/// what to do with PC once an instruction has run
enum Flow {
    Next,
    Skip,
    Jump(Address),
    /// fetch this same instruction again
    Repeat,
}

pub struct Chip8Interpreter {
    v: [u8; 16],
    i: u16,
    program_counter: u16,
    stack: [u16; STACK_DEPTH],
    stack_pointer: usize,
    timers: Timers,
    waiting_for_key: bool,
    quirks: Quirks,
}

/// first address outside memory, for an access at `addr` that didn't fit
fn overrun(addr: u16) -> usize {
    (addr as usize).max(CHIP8_RAM_SIZE_BYTES)
}

impl Chip8Interpreter {
    pub fn new(quirks: Quirks) -> Self {
        Chip8Interpreter {
            v: [0; 16],
            i: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            timers: Timers::default(),
            waiting_for_key: false,
            quirks,
        }
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    /// V0-VF; only the low nibble of `x` is used
    pub fn register(&self, x: Register) -> u8 {
        self.v[(x & 0xf) as usize]
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn stack_depth(&self) -> usize {
        self.stack_pointer
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    /// 60Hz tick
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.waiting_for_key
    }

    /// fetch, decode and execute one instruction
    pub fn step(&mut self, p: &mut Peripherals) -> Result<Instruction, Fault> {
        let pc = self.program_counter;
        let opcode = p.memory.get_word(pc).ok_or(Fault::Address {
            pc,
            addr: overrun(pc),
        })?;
        let instruction = Instruction::decode(opcode).ok_or(Fault::Decode { pc, opcode })?;
        trace!("{:#05x}: {:04x} {}", pc, opcode, instruction);

        self.program_counter = pc + 2;
        match self.execute(instruction, pc, p) {
            Ok(Flow::Next) => {}
            Ok(Flow::Skip) => self.program_counter += 2,
            Ok(Flow::Jump(addr)) => self.program_counter = addr,
            Ok(Flow::Repeat) => self.program_counter = pc,
            Err(fault) => {
                self.program_counter = pc;
                return Err(fault);
            }
        }
        Ok(instruction)
    }

    fn skip_if(cond: bool) -> Flow {
        if cond {
            Flow::Skip
        } else {
            Flow::Next
        }
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        pc: u16,
        p: &mut Peripherals,
    ) -> Result<Flow, Fault> {
        use Instruction::*;

        let vx = |x: Register| x as usize;
        let flow = match instruction {
            ClearDisplay => {
                p.display.clear();
                Flow::Next
            }
            Return => {
                if self.stack_pointer == 0 {
                    return Err(Fault::StackUnderflow { pc });
                }
                self.stack_pointer -= 1;
                Flow::Jump(self.stack[self.stack_pointer])
            }
            Jump(addr) => Flow::Jump(addr),
            Call(addr) => {
                if self.stack_pointer == STACK_DEPTH {
                    return Err(Fault::StackOverflow { pc });
                }
                self.stack[self.stack_pointer] = self.program_counter;
                self.stack_pointer += 1;
                Flow::Jump(addr)
            }
            SkipIfEqualByte(x, nn) => Self::skip_if(self.v[vx(x)] == nn),
            SkipIfNotEqualByte(x, nn) => Self::skip_if(self.v[vx(x)] != nn),
            SkipIfEqual(x, y) => Self::skip_if(self.v[vx(x)] == self.v[vx(y)]),
            SkipIfNotEqual(x, y) => Self::skip_if(self.v[vx(x)] != self.v[vx(y)]),
            LoadByte(x, nn) => {
                self.v[vx(x)] = nn;
                Flow::Next
            }
            AddByte(x, nn) => {
                // no carry for 7XNN
                self.v[vx(x)] = self.v[vx(x)].wrapping_add(nn);
                Flow::Next
            }
            Move(x, y) => {
                self.v[vx(x)] = self.v[vx(y)];
                Flow::Next
            }
            Or(x, y) => {
                self.v[vx(x)] |= self.v[vx(y)];
                Flow::Next
            }
            And(x, y) => {
                self.v[vx(x)] &= self.v[vx(y)];
                Flow::Next
            }
            Xor(x, y) => {
                self.v[vx(x)] ^= self.v[vx(y)];
                Flow::Next
            }
            Add(x, y) => {
                let (sum, carry) = self.v[vx(x)].overflowing_add(self.v[vx(y)]);
                self.v[vx(x)] = sum;
                self.v[FLAG] = carry as u8;
                Flow::Next
            }
            Sub(x, y) => {
                let (a, b) = (self.v[vx(x)], self.v[vx(y)]);
                self.v[vx(x)] = a.wrapping_sub(b);
                self.v[FLAG] = (a >= b) as u8;
                Flow::Next
            }
            SubReverse(x, y) => {
                let (a, b) = (self.v[vx(x)], self.v[vx(y)]);
                self.v[vx(x)] = b.wrapping_sub(a);
                self.v[FLAG] = (b >= a) as u8;
                Flow::Next
            }
            ShiftRight(x, y) => {
                let src = self.shift_source(x, y);
                self.v[vx(x)] = src >> 1;
                self.v[FLAG] = src & 0x01;
                Flow::Next
            }
            ShiftLeft(x, y) => {
                let src = self.shift_source(x, y);
                self.v[vx(x)] = src << 1;
                self.v[FLAG] = src >> 7;
                Flow::Next
            }
            LoadIndex(addr) => {
                self.i = addr;
                Flow::Next
            }
            JumpOffset(x, addr) => {
                let offset = match self.quirks.jump {
                    JumpQuirk::V0 => self.v[0],
                    JumpQuirk::Vx => self.v[vx(x)],
                };
                let target = addr as usize + offset as usize;
                if target >= CHIP8_RAM_SIZE_BYTES {
                    return Err(Fault::Address { pc, addr: target });
                }
                Flow::Jump(target as u16)
            }
            Random(x, nn) => {
                self.v[vx(x)] = p.random.next_byte() & nn;
                Flow::Next
            }
            Draw(x, y, n) => {
                let sprite = p
                    .memory
                    .get_ro_slice(self.i, n as usize)
                    .ok_or(Fault::Address {
                        pc,
                        addr: overrun(self.i),
                    })?;
                let collision = p.display.draw(self.v[vx(x)], self.v[vx(y)], sprite);
                self.v[FLAG] = collision as u8;
                Flow::Next
            }
            // the keypad only decodes the low nibble
            SkipIfPressed(x) => Self::skip_if(p.keypad.is_pressed(self.v[vx(x)] & 0xf)),
            SkipIfNotPressed(x) => Self::skip_if(!p.keypad.is_pressed(self.v[vx(x)] & 0xf)),
            LoadDelay(x) => {
                self.v[vx(x)] = self.timers.delay;
                Flow::Next
            }
            WaitForKey(x) => {
                if !self.waiting_for_key {
                    p.keypad.arm_capture();
                    self.waiting_for_key = true;
                    debug!("waiting for key into V{:X} at {:#05x}", x, pc);
                    Flow::Repeat
                } else if let Some(key) = p.keypad.take_capture() {
                    self.v[vx(x)] = key;
                    self.waiting_for_key = false;
                    debug!("key {:X} captured into V{:X}", key, x);
                    Flow::Next
                } else {
                    Flow::Repeat
                }
            }
            SetDelay(x) => {
                self.timers.delay = self.v[vx(x)];
                Flow::Next
            }
            SetSound(x) => {
                self.timers.sound = self.v[vx(x)];
                Flow::Next
            }
            AddIndex(x) => {
                let sum = self.i as usize + self.v[vx(x)] as usize;
                if sum >= CHIP8_RAM_SIZE_BYTES {
                    return Err(Fault::Address { pc, addr: sum });
                }
                self.i = sum as u16;
                Flow::Next
            }
            LoadFont(x) => {
                self.i = Chip8MemoryMap::font_addr(self.v[vx(x)]);
                Flow::Next
            }
            StoreBcd(x) => {
                let value = self.v[vx(x)];
                let cells = p.memory.get_rw_slice(self.i, 3).ok_or(Fault::Address {
                    pc,
                    addr: overrun(self.i),
                })?;
                cells.copy_from_slice(&[value / 100, (value / 10) % 10, value % 10]);
                Flow::Next
            }
            StoreRegisters(x) => {
                let len = vx(x) + 1;
                let cells = p.memory.get_rw_slice(self.i, len).ok_or(Fault::Address {
                    pc,
                    addr: overrun(self.i),
                })?;
                cells.copy_from_slice(&self.v[..len]);
                self.bump_index(len);
                Flow::Next
            }
            LoadRegisters(x) => {
                let len = vx(x) + 1;
                let cells = p.memory.get_ro_slice(self.i, len).ok_or(Fault::Address {
                    pc,
                    addr: overrun(self.i),
                })?;
                self.v[..len].copy_from_slice(cells);
                self.bump_index(len);
                Flow::Next
            }
        };
        Ok(flow)
    }

    fn shift_source(&self, x: Register, y: Register) -> u8 {
        match self.quirks.shift {
            ShiftQuirk::InPlace => self.v[x as usize],
            ShiftQuirk::CopyVy => self.v[y as usize],
        }
    }

    fn bump_index(&mut self, len: usize) {
        // the range was just checked against memory, so this stays in u16
        if self.quirks.load_store == LoadStoreQuirk::Increment {
            self.i += len as u16;
        }
    }
}
