///
/// ## Design
///
/// * the machine owns nothing but its own state; the host owns the clock,
///   the screen, the keyboard and the speaker
/// * instruction rate and timer rate are separate clocks: the host forwards
///   elapsed wall time to `run` and ticks the timers at 60Hz
/// * fetch/decode/execute over a fixed 4K address space; anything that steps
///   outside it, over/underflows the stack or doesn't decode halts the machine
/// * the framebuffer is one byte per pixel with a dirty flag; the host reads it
///   in place through a borrowed view
/// * dialect quirks (shift operand, jump offset, load/store index) are config,
///   defaulting to the original interpreter
///
/// Model
///
/// VirtualMachine
///  |-- Chip8Interpreter (V0-VF, I, PC, stack, timers, quirks)
///  |-- Chip8MemoryMap (font, program)
///  |-- Framebuffer (64x32 + dirty flag)
///  |-- Keypad (16 latches)
///  `-- RandomSource
///
/// Host (src/main.rs)
///  |-- screen, input, sound, config from the command line
///  `-- main loop at 60Hz
///       |-- vm.run(elapsed)
///       |-- vm.advance_timers()
///       |-- forward key presses/releases
///       `-- if vm.display_changed() { screen.draw(vm.framebuffer_view()) }
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keypad;
pub mod memory;
pub mod random;
pub mod screen;
pub mod sound;
pub mod timer;
pub mod vm;

pub use config::{Config, JumpQuirk, LoadStoreQuirk, Quirks, ShiftQuirk};
pub use display::{FrameView, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use error::{Chip8Error, Fault, LoadError, Result};
pub use instruction::Instruction;
pub use vm::VirtualMachine;
