use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

use super::{MicrocodeError, MicrocodeProgram};

/// The reduced "bonsai" instruction set: FETCH, INC, DEC, JMP, TST, HLT.
pub const BONSAI_MC: &str = "8;2;3;5;0;0;0;0;0;0;4;2;18;16;15;1;9;7;0;0;4;2;18;17;15;1;9;7;0;0;11;7;0;0;0;0;0;0;0;0;4;2;18;10;9;7;0;0;0;0;19;7;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;FETCH;INC;DEC;JMP;TST;HLT";

/// The full instruction set: FETCH, TAKE, ADD, SUB, SAVE, JMP, TST, INC,
/// DEC, NULL, HLT.
pub const NORMAL_MC: &str = "8;2;3;5;0;0;0;0;0;0;12;4;2;13;9;7;0;0;0;0;4;2;13;9;7;0;0;0;0;0;4;2;14;9;7;0;0;0;0;0;4;15;1;9;7;0;0;0;0;0;11;7;0;0;0;0;0;0;0;0;4;2;18;10;9;7;0;0;0;0;12;4;2;13;16;15;1;9;7;0;12;4;2;13;17;15;1;9;7;0;4;12;15;1;9;7;0;0;0;0;19;7;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;FETCH;TAKE;ADD;SUB;SAVE;JMP;TST;INC;DEC;NULL;HLT";

const BONSAI_OPCODE_COUNT: usize = 6;
const NORMAL_OPCODE_COUNT: usize = 11;

/// Name count assumed for a description that matches no built-in one.
pub const DEFAULT_OPCODE_COUNT: usize = NORMAL_OPCODE_COUNT;

lazy_static! {
    static ref NORMAL_PROGRAM: MicrocodeProgram =
        MicrocodeProgram::parse(NORMAL_MC, Some(NORMAL_OPCODE_COUNT));
    static ref BONSAI_PROGRAM: MicrocodeProgram =
        MicrocodeProgram::parse(BONSAI_MC, Some(BONSAI_OPCODE_COUNT));
}

pub(super) fn detect_opcode_count(text: &str) -> usize {
    if text == BONSAI_MC {
        BONSAI_OPCODE_COUNT
    } else if text == NORMAL_MC {
        NORMAL_OPCODE_COUNT
    } else {
        DEFAULT_OPCODE_COUNT
    }
}

/// Built-in instruction set variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MicrocodeMode {
    #[default]
    Normal,
    Bonsai,
}

impl MicrocodeMode {
    pub const ALL: [MicrocodeMode; 2] = [MicrocodeMode::Normal, MicrocodeMode::Bonsai];

    /// The textual description shipped for this variant.
    pub fn text(self) -> &'static str {
        match self {
            MicrocodeMode::Normal => NORMAL_MC,
            MicrocodeMode::Bonsai => BONSAI_MC,
        }
    }

    pub fn opcode_count(self) -> usize {
        match self {
            MicrocodeMode::Normal => NORMAL_OPCODE_COUNT,
            MicrocodeMode::Bonsai => BONSAI_OPCODE_COUNT,
        }
    }

    /// The parsed program, built once per process.
    pub fn program(self) -> &'static MicrocodeProgram {
        match self {
            MicrocodeMode::Normal => &NORMAL_PROGRAM,
            MicrocodeMode::Bonsai => &BONSAI_PROGRAM,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MicrocodeMode::Normal => "normal",
            MicrocodeMode::Bonsai => "bonsai",
        }
    }
}

impl fmt::Display for MicrocodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MicrocodeMode {
    type Err = MicrocodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(MicrocodeMode::Normal),
            "bonsai" => Ok(MicrocodeMode::Bonsai),
            _ => Err(MicrocodeError::UnknownMode(s.to_string())),
        }
    }
}
