//! # instruction set
//!
//! (from: http://devernay.free.fr/hacks/chip8/C8TECH10.HTM#3.1)
//! opcodes are two bytes, big-endian; the high nibble picks the family and
//! 0x0, 0x8, 0xE and 0xF families pick the instruction with the low
//! nibble/byte. 0NNN (call machine code) is not part of the set we run.

use std::fmt;

pub type Address = u16;
pub type Register = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearDisplay,                        // 00E0
    Return,                              // 00EE
    Jump(Address),                       // 1NNN
    Call(Address),                       // 2NNN
    SkipIfEqualByte(Register, u8),       // 3XNN
    SkipIfNotEqualByte(Register, u8),    // 4XNN
    SkipIfEqual(Register, Register),     // 5XY0
    LoadByte(Register, u8),              // 6XNN
    AddByte(Register, u8),               // 7XNN
    Move(Register, Register),            // 8XY0
    Or(Register, Register),              // 8XY1
    And(Register, Register),             // 8XY2
    Xor(Register, Register),             // 8XY3
    Add(Register, Register),             // 8XY4
    Sub(Register, Register),             // 8XY5
    ShiftRight(Register, Register),      // 8XY6
    SubReverse(Register, Register),      // 8XY7
    ShiftLeft(Register, Register),       // 8XYE
    SkipIfNotEqual(Register, Register),  // 9XY0
    LoadIndex(Address),                  // ANNN
    JumpOffset(Register, Address),       // BNNN
    Random(Register, u8),                // CXNN
    Draw(Register, Register, u8),        // DXYN
    SkipIfPressed(Register),             // EX9E
    SkipIfNotPressed(Register),          // EXA1
    LoadDelay(Register),                 // FX07
    WaitForKey(Register),                // FX0A
    SetDelay(Register),                  // FX15
    SetSound(Register),                  // FX18
    AddIndex(Register),                  // FX1E
    LoadFont(Register),                  // FX29
    StoreBcd(Register),                  // FX33
    StoreRegisters(Register),            // FX55
    LoadRegisters(Register),             // FX65
}

impl Instruction {
    /// None if the opcode isn't in the table
    pub fn decode(opcode: u16) -> Option<Instruction> {
        use Instruction::*;

        let x = ((opcode >> 8) & 0xf) as Register;
        let y = ((opcode >> 4) & 0xf) as Register;
        let n = (opcode & 0xf) as u8;
        let nn = (opcode & 0xff) as u8;
        let nnn = opcode & 0x0fff;

        let i = match opcode >> 12 {
            0x0 => match opcode {
                0x00e0 => ClearDisplay,
                0x00ee => Return,
                _ => return None,
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipIfEqualByte(x, nn),
            0x4 => SkipIfNotEqualByte(x, nn),
            0x5 if n == 0 => SkipIfEqual(x, y),
            0x6 => LoadByte(x, nn),
            0x7 => AddByte(x, nn),
            0x8 => match n {
                0x0 => Move(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => Add(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x, y),
                0x7 => SubReverse(x, y),
                0xe => ShiftLeft(x, y),
                _ => return None,
            },
            0x9 if n == 0 => SkipIfNotEqual(x, y),
            0xa => LoadIndex(nnn),
            0xb => JumpOffset(x, nnn),
            0xc => Random(x, nn),
            0xd => Draw(x, y, n),
            0xe => match nn {
                0x9e => SkipIfPressed(x),
                0xa1 => SkipIfNotPressed(x),
                _ => return None,
            },
            0xf => match nn {
                0x07 => LoadDelay(x),
                0x0a => WaitForKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => LoadFont(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegisters(x),
                0x65 => LoadRegisters(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(i)
    }
}

/// Cowgod-style mnemonics, for traces
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearDisplay => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:#05x}", a),
            Call(a) => write!(f, "CALL {:#05x}", a),
            SkipIfEqualByte(x, b) => write!(f, "SE V{:X}, {:#04x}", x, b),
            SkipIfNotEqualByte(x, b) => write!(f, "SNE V{:X}, {:#04x}", x, b),
            SkipIfEqual(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadByte(x, b) => write!(f, "LD V{:X}, {:#04x}", x, b),
            AddByte(x, b) => write!(f, "ADD V{:X}, {:#04x}", x, b),
            Move(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipIfNotEqual(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(a) => write!(f, "LD I, {:#05x}", a),
            // the offset register depends on the jump quirk
            JumpOffset(x, a) => write!(f, "JP V0/V{:X}, {:#05x}", x, a),
            Random(x, b) => write!(f, "RND V{:X}, {:#04x}", x, b),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipIfPressed(x) => write!(f, "SKP V{:X}", x),
            SkipIfNotPressed(x) => write!(f, "SKNP V{:X}", x),
            LoadDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitForKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            LoadFont(x) => write!(f, "LD F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegisters(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegisters(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
