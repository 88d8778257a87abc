//! Microcode program model and parser.
//!
//! A microcode description is a `;`-separated token list: micro-op codes
//! first, then one name per macro-instruction. Parsing happens in two
//! phases: the text is split into tokens, then each token in the
//! instruction region is converted on its own. A token that is not a
//! micro-op number does not abort the parse; it becomes
//! [`MicroWord::Invalid`] and halts the machine if it is ever executed.

mod builtin;
mod listing;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::cpu::MicroOp;
use crate::{MICROCODE_TEXT_SLOTS, MICRO_SLOTS_PER_INSTRUCTION};

pub use builtin::{MicrocodeMode, BONSAI_MC, DEFAULT_OPCODE_COUNT, NORMAL_MC};
pub use listing::{describe_micro_op, ListingRow};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MicrocodeError {
    #[error("invalid micro-op token {0:?}")]
    InvalidToken(String),
    #[error("micro-op slot {index} is outside the program ({len} slots)")]
    SlotOutOfRange { index: usize, len: usize },
    #[error("unknown microcode mode {0:?} (expected `normal` or `bonsai`)")]
    UnknownMode(String),
}

/// One slot of a macro-instruction block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MicroWord {
    Code(u32),
    /// A token that failed conversion, kept verbatim so the program can be
    /// written back out unchanged.
    Invalid(Box<str>),
}

impl MicroWord {
    pub const NOP: MicroWord = MicroWord::Code(0);

    /// Convert a single token, logging and keeping it as `Invalid` on failure.
    pub fn from_token(token: &str) -> Self {
        match parse_token(token) {
            Ok(code) => MicroWord::Code(code),
            Err(err) => {
                log::warn!("microcode: {err}");
                MicroWord::Invalid(token.trim().into())
            }
        }
    }

    #[inline]
    pub fn code(&self) -> Option<u32> {
        match self {
            MicroWord::Code(code) => Some(*code),
            MicroWord::Invalid(_) => None,
        }
    }

    /// The micro-op this slot executes, if it is a known one.
    #[inline]
    pub fn micro_op(&self) -> Option<MicroOp> {
        self.code().and_then(MicroOp::from_code)
    }

    #[inline]
    pub fn is_nop(&self) -> bool {
        matches!(self, MicroWord::Code(0))
    }
}

impl Default for MicroWord {
    fn default() -> Self {
        MicroWord::NOP
    }
}

impl From<u32> for MicroWord {
    fn from(code: u32) -> Self {
        MicroWord::Code(code)
    }
}

impl From<MicroOp> for MicroWord {
    fn from(op: MicroOp) -> Self {
        MicroWord::Code(op.code())
    }
}

impl fmt::Display for MicroWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicroWord::Code(code) => write!(f, "{code}"),
            MicroWord::Invalid(token) => f.write_str(token),
        }
    }
}

/// Strict conversion of one token to a micro-op code.
///
/// Surrounding whitespace is ignored and an empty token reads as `0`.
pub fn parse_token(token: &str) -> Result<u32, MicrocodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(0);
    }
    token
        .parse::<u32>()
        .map_err(|_| MicrocodeError::InvalidToken(token.to_string()))
}

/// The ten micro-op slots of one macro-instruction.
pub type MicroBlock = [MicroWord; MICRO_SLOTS_PER_INSTRUCTION];

/// A parsed microcode program: one block and one name per opcode.
///
/// The flattened slot sequence consumed by the CPU is built together with
/// the blocks and rebuilt together on every edit, so the two never drift
/// apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MicrocodeProgram {
    instructions: Vec<MicroBlock>,
    operations: Vec<String>,
    flat: Arc<[MicroWord]>,
}

/// A problem found by [`MicrocodeProgram::validate_blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockIssue {
    /// The FETCH block never dispatches (micro-op 5) into an instruction.
    MissingDispatch,
    /// Execution reaches an unknown micro-op at `slot` and halts.
    UnknownMicroOp { slot: usize },
    /// The block never resets the micro-program counter (micro-op 7) and
    /// falls through into the next block.
    MissingReset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockFinding {
    pub opcode: usize,
    pub name: Option<String>,
    pub issue: BlockIssue,
}

impl fmt::Display for BlockFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opcode {:02} ({}): ",
            self.opcode,
            self.name.as_deref().unwrap_or("unnamed")
        )?;
        match self.issue {
            BlockIssue::MissingDispatch => write!(f, "fetch block never dispatches (op 5)"),
            BlockIssue::UnknownMicroOp { slot } => {
                write!(f, "unknown micro-op in slot {slot} halts the machine")
            }
            BlockIssue::MissingReset => write!(f, "block never resets the micro counter (op 7)"),
        }
    }
}

impl MicrocodeProgram {
    pub fn new(instructions: Vec<MicroBlock>, operations: Vec<String>) -> Self {
        let flat = flatten_blocks(&instructions);
        Self {
            instructions,
            operations,
            flat,
        }
    }

    /// Parse a textual description.
    ///
    /// `opcode_count` is the number of trailing name tokens. When omitted it
    /// is detected by exact match against the built-in descriptions and
    /// otherwise falls back to [`DEFAULT_OPCODE_COUNT`].
    pub fn parse(text: &str, opcode_count: Option<usize>) -> Self {
        let count = opcode_count.unwrap_or_else(|| builtin::detect_opcode_count(text));

        // Phase one: tokenize.
        let tokens: Vec<&str> = text.split(';').collect();
        let split = tokens.len().saturating_sub(count);
        let (numbers, names) = tokens.split_at(split);

        // Phase two: convert only the slots that belong to a macro-instruction.
        let used = &numbers[..numbers.len().min(count * MICRO_SLOTS_PER_INSTRUCTION)];
        let instructions: Vec<MicroBlock> = used
            .chunks(MICRO_SLOTS_PER_INSTRUCTION)
            .map(|chunk| {
                std::array::from_fn(|i| {
                    chunk
                        .get(i)
                        .map(|token| MicroWord::from_token(token))
                        .unwrap_or_default()
                })
            })
            .collect();
        let operations: Vec<String> = names.iter().map(|name| name.to_string()).collect();

        Self::new(instructions, operations)
    }

    pub fn instructions(&self) -> &[MicroBlock] {
        &self.instructions
    }

    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// The flattened slot sequence, shared with every CPU state that loads it.
    pub fn flatten(&self) -> Arc<[MicroWord]> {
        Arc::clone(&self.flat)
    }

    /// Number of micro-op slots in the flattened program.
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn operation_name(&self, opcode: usize) -> Option<&str> {
        self.operations.get(opcode).map(String::as_str)
    }

    /// Zero-padded two-digit opcode → macro-instruction name.
    pub fn opcode_mapping(&self) -> BTreeMap<String, String> {
        opcode_mapping(&self.operations)
    }

    /// Return a copy of the program with the slot at `index` (a position in
    /// the flattened sequence) replaced by `code`.
    pub fn set_micro_op(&self, index: usize, code: u32) -> Result<Self, MicrocodeError> {
        if index >= self.len() {
            return Err(MicrocodeError::SlotOutOfRange {
                index,
                len: self.len(),
            });
        }
        let mut instructions = self.instructions.clone();
        instructions[index / MICRO_SLOTS_PER_INSTRUCTION][index % MICRO_SLOTS_PER_INSTRUCTION] =
            MicroWord::Code(code);
        Ok(Self::new(instructions, self.operations.clone()))
    }

    /// Check that every block can finish.
    ///
    /// FETCH (block 0) has to dispatch with micro-op 5; every other block
    /// that is not entirely empty has to reach micro-op 7 within its slots.
    /// Halt (19) on the way is fine. Findings are logged and returned, the
    /// program itself stays loadable.
    pub fn validate_blocks(&self) -> Vec<BlockFinding> {
        let mut findings = Vec::new();
        for (opcode, block) in self.instructions.iter().enumerate() {
            if opcode != 0 && block.iter().all(MicroWord::is_nop) {
                continue;
            }
            let terminator = if opcode == 0 {
                MicroOp::IrToMc
            } else {
                MicroOp::ResetMc
            };
            let issue = match block_end(block, terminator) {
                BlockEnd::Terminated => continue,
                BlockEnd::Unknown(slot) => BlockIssue::UnknownMicroOp { slot },
                BlockEnd::FallsThrough if opcode == 0 => BlockIssue::MissingDispatch,
                BlockEnd::FallsThrough => BlockIssue::MissingReset,
            };
            let finding = BlockFinding {
                opcode,
                name: self.operation_name(opcode).map(str::to_string),
                issue,
            };
            log::warn!("microcode: {finding}");
            findings.push(finding);
        }
        findings
    }
}

enum BlockEnd {
    Terminated,
    Unknown(usize),
    FallsThrough,
}

fn block_end(block: &MicroBlock, terminator: MicroOp) -> BlockEnd {
    for (slot, word) in block.iter().enumerate() {
        match word.micro_op() {
            Some(op) if op == terminator => return BlockEnd::Terminated,
            Some(_) => {}
            None => return BlockEnd::Unknown(slot),
        }
    }
    BlockEnd::FallsThrough
}

fn flatten_blocks(instructions: &[MicroBlock]) -> Arc<[MicroWord]> {
    instructions.iter().flatten().cloned().collect()
}

/// Renders the program back into its `;`-separated text form. Slots are
/// padded with `0` up to [`MICROCODE_TEXT_SLOTS`], so a built-in program
/// renders to exactly its shipped description.
impl fmt::Display for MicrocodeProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let padding = MICROCODE_TEXT_SLOTS.saturating_sub(self.flat.len());
        let words = self
            .flat
            .iter()
            .map(|w| w.to_string())
            .chain(std::iter::repeat_with(|| "0".to_string()).take(padding));
        let mut first = true;
        for token in words.chain(self.operations.iter().cloned()) {
            if !first {
                f.write_str(";")?;
            }
            f.write_str(&token)?;
            first = false;
        }
        Ok(())
    }
}

pub fn parse_microcode(text: &str, opcode_count: Option<usize>) -> MicrocodeProgram {
    MicrocodeProgram::parse(text, opcode_count)
}

pub fn flatten(program: &MicrocodeProgram) -> Arc<[MicroWord]> {
    program.flatten()
}

/// Map each operation to its zero-padded two-digit opcode string.
pub fn opcode_mapping<S: AsRef<str>>(operations: &[S]) -> BTreeMap<String, String> {
    operations
        .iter()
        .enumerate()
        .map(|(index, name)| (format!("{index:02}"), name.as_ref().to_string()))
        .collect()
}

#[cfg(test)]
mod tests;
