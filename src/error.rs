use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VmError>;

/// Everything that can go wrong inside the machine. Load failures are fatal
/// before a session starts; stack and memory faults halt the running program
/// with a cause instead of corrupting adjacent state.
#[derive(Debug, Error)]
pub enum VmError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("program is {len} bytes; at most {max} fit above 0x200")]
    ProgramTooLarge { len: usize, max: usize },

    #[error("call stack overflow (more than {depth} nested calls)")]
    StackOverflow { depth: usize },

    #[error("call stack underflow (return without a matching call)")]
    StackUnderflow,

    #[error("memory access out of range: {addr:#06x}")]
    MemoryFault { addr: usize },
}
