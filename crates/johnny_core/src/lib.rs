//! Microcode-level execution engine for the Johnny teaching computer.
//!
//! The machine is a small von-Neumann design: a 1000-cell decimal RAM, an
//! accumulator, a program counter, an instruction register and two buses.
//! Every macro-instruction (TAKE, ADD, ...) is a block of ten micro-ops in
//! a [`MicrocodeProgram`]; the [`CpuState`] walks that block one micro-op at
//! a time via its micro-program counter.
//!
//! All stepping functions are pure: they take a state by reference and
//! return the next state, leaving the input untouched.

pub mod cell;
pub mod cpu;
pub mod microcode;

pub use cell::{
    decode_cell, decode_ram, encode_cell, extract_data, extract_opcode, CellError, OpData,
};
pub use cpu::{
    execute_instruction, execute_micro_step, CounterAction, CpuState, MicroOp, Phase,
    CLEAN_CPU_STATE,
};
pub use microcode::{
    describe_micro_op, flatten, opcode_mapping, parse_microcode, parse_token, BlockFinding,
    BlockIssue, ListingRow, MicroBlock, MicroWord, MicrocodeError, MicrocodeMode,
    MicrocodeProgram,
};

/// Number of cells in RAM. Addresses run from `0` to `RAM_SIZE - 1`.
pub const RAM_SIZE: usize = 1000;

/// Decimal digits reserved for the opcode part of a RAM cell.
pub const RAM_CELL_OPCODE_DIGITS: u32 = 2;
/// Decimal digits reserved for the data (address/operand) part of a RAM cell.
pub const RAM_CELL_DATA_DIGITS: u32 = 3;
pub const RAM_CELL_TOTAL_DIGITS: u32 = RAM_CELL_OPCODE_DIGITS + RAM_CELL_DATA_DIGITS;

/// Multiplier separating opcode and data inside a cell (`10^data_digits`).
pub const RAM_CELL_DATA_RADIX: u32 = 10u32.pow(RAM_CELL_DATA_DIGITS);
pub const MAX_OPCODE: u32 = 10u32.pow(RAM_CELL_OPCODE_DIGITS) - 1;
pub const MAX_DATA: u32 = RAM_CELL_DATA_RADIX - 1;
pub const MAX_CELL: u32 = 10u32.pow(RAM_CELL_TOTAL_DIGITS) - 1;

/// Upper bound of the accumulator; arithmetic micro-ops clamp to `0..=ACC_MAX`.
pub const ACC_MAX: u32 = 999;

/// Micro-op slots per macro-instruction block.
pub const MICRO_SLOTS_PER_INSTRUCTION: usize = 10;

/// Slots written out when a microcode program is rendered as text (20
/// blocks), matching the shipped descriptions. Shorter programs are padded
/// with `0`.
pub const MICROCODE_TEXT_SLOTS: usize = 200;

/// Hard ceiling on micro-steps inside one `execute_instruction` call.
///
/// A well-formed block needs at most 4 fetch steps plus 10 block steps, so
/// hitting this means the loaded microcode loops without ever resetting the
/// micro-program counter.
pub const MAX_MICRO_STEPS_PER_INSTRUCTION: usize = 256;
