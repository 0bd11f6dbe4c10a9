//! A CHIP-8 virtual machine.
//!
//! The core is the fetch/decode/execute engine in [`interpreter`] together
//! with its memory, register, stack, framebuffer and timer model, paced by
//! the 60 Hz [`scheduler`]. Presentation, sound and input are collaborators
//! behind the traits in [`display`], [`sound`] and [`input`], so the machine
//! can run against a terminal, a test double, or anything else.
//!
//! Opcode semantics vary by [`interpreter::QuirkMode`]: `Legacy` follows the
//! original COSMAC VIP interpreter (shifts read VY, register dump/load walk
//! the index register, draws pace the frame), `Modern` the SCHIP lineage,
//! and `Extended` currently behaves like `Modern`.

pub mod decode;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod scheduler;
pub mod sound;

pub use error::{Result, VmError};
pub use interpreter::{Interpreter, QuirkMode};
pub use scheduler::{boot, RunState, Scheduler, DEFAULT_IPS};
