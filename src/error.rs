use thiserror::Error;

/// Why a program image could not be turned into a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("program image is empty")]
    Empty,
    #[error("program image is {len} bytes; only {max} fit above 0x200")]
    TooLarge { len: usize, max: usize },
}

/// Fatal conditions raised while executing. Each carries the address of the
/// instruction that raised it; the program counter is left pointing there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("address {addr:#05x} out of range at pc {pc:#05x}")]
    Address { pc: u16, addr: usize },
    #[error("call stack overflow at pc {pc:#05x}")]
    StackOverflow { pc: u16 },
    #[error("return with empty call stack at pc {pc:#05x}")]
    StackUnderflow { pc: u16 },
    #[error("unknown opcode {opcode:#06x} at pc {pc:#05x}")]
    Decode { pc: u16, opcode: u16 },
}

impl Fault {
    /// address of the offending instruction
    pub fn pc(&self) -> u16 {
        match *self {
            Fault::Address { pc, .. }
            | Fault::StackOverflow { pc }
            | Fault::StackUnderflow { pc }
            | Fault::Decode { pc, .. } => pc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Chip8Error {
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("execution fault: {0}")]
    Fault(#[from] Fault),
    #[error("machine halted by earlier fault: {0}")]
    Halted(Fault),
    #[error("key {0:#04x} is outside the keypad range 0x0-0xf")]
    InvalidKey(u8),
    #[error("instruction rate must be positive and finite, got {0}")]
    InvalidRate(f64),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_pc() {
        assert_eq!(Fault::Decode { pc: 0x204, opcode: 0xffff }.pc(), 0x204);
        assert_eq!(Fault::StackUnderflow { pc: 0x200 }.pc(), 0x200);
    }

    #[test]
    fn test_fault_converts() {
        let e: Chip8Error = Fault::StackOverflow { pc: 0x222 }.into();
        assert_eq!(e, Chip8Error::Fault(Fault::StackOverflow { pc: 0x222 }));
        assert_eq!(e.to_string(), "execution fault: call stack overflow at pc 0x222");
    }
}
