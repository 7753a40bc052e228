pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod exec;
pub mod hardware;
pub mod instructions;
pub mod lexer;
pub mod memory;
pub mod object;
pub mod operand;
pub mod parser;
pub mod program;

pub use cpu::{Cpu, CpuConfig, Flags, Step};
pub use disasm::disassemble;
pub use engine::{Dcpu, Engine};
pub use error::AsmError;
pub use memory::Memory;
pub use program::{Instruction, Program};

/// Parses and lays out a source file.
pub fn parse_program(source: &str) -> Result<Program, AsmError> {
    Program::build(parser::parse(source)?)
}

/// Source text to word stream.
pub fn assemble(source: &str) -> Result<Vec<u16>, AsmError> {
    parse_program(source)?.encode()
}
