//! RAM cell codec.
//!
//! A cell packs an `(opcode, data)` pair into one decimal integer:
//! `cell = opcode * 1000 + data`. With the reference digit budget (2 + 3)
//! the largest cell is `99999`.

use std::fmt;

use thiserror::Error;

use crate::microcode::MicrocodeProgram;
use crate::{
    MAX_CELL, MAX_DATA, MAX_OPCODE, RAM_CELL_DATA_DIGITS, RAM_CELL_DATA_RADIX,
    RAM_CELL_OPCODE_DIGITS,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("opcode {0} does not fit in {} digits (max {})", RAM_CELL_OPCODE_DIGITS, MAX_OPCODE)]
    OpcodeOutOfRange(u32),
    #[error("data {0} does not fit in {} digits (max {})", RAM_CELL_DATA_DIGITS, MAX_DATA)]
    DataOutOfRange(u32),
    #[error("cell value {0} exceeds {}", MAX_CELL)]
    CellOutOfRange(u32),
}

/// Pack an opcode and its data into a RAM cell. Values outside the digit
/// budget are rejected, never truncated.
pub fn encode_cell(opcode: u32, data: u32) -> Result<u32, CellError> {
    if opcode > MAX_OPCODE {
        return Err(CellError::OpcodeOutOfRange(opcode));
    }
    if data > MAX_DATA {
        return Err(CellError::DataOutOfRange(data));
    }
    Ok(opcode * RAM_CELL_DATA_RADIX + data)
}

/// Split a RAM cell into `(opcode, data)`.
pub fn decode_cell(cell: u32) -> Result<(u32, u32), CellError> {
    if cell > MAX_CELL {
        return Err(CellError::CellOutOfRange(cell));
    }
    Ok((extract_opcode(cell), extract_data(cell)))
}

/// Opcode part of a cell. Total; used by the micro-ops that interpret the
/// instruction register.
#[inline]
pub const fn extract_opcode(cell: u32) -> u32 {
    cell / RAM_CELL_DATA_RADIX
}

/// Data part of a cell, always in `0..=MAX_DATA`.
#[inline]
pub const fn extract_data(cell: u32) -> u32 {
    cell % RAM_CELL_DATA_RADIX
}

/// A RAM cell read back as an operation name plus its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpData<'a> {
    /// Empty when the opcode has no macro-instruction in the program.
    pub name: &'a str,
    pub data: u32,
}

impl fmt::Display for OpData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { "???" } else { self.name };
        write!(f, "{name} {:03}", self.data)
    }
}

/// Decode a cell against a microcode program's operation names.
pub fn decode_ram(cell: u32, program: &MicrocodeProgram) -> OpData<'_> {
    let opcode = extract_opcode(cell);
    OpData {
        name: program.operation_name(opcode as usize).unwrap_or_default(),
        data: extract_data(cell),
    }
}
