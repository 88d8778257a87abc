use johnny_core::{decode_cell, CellError, CpuState, MicrocodeMode, MicrocodeProgram, RAM_SIZE};
use thiserror::Error;
use typed_builder::TypedBuilder;

/// Instruction cap used when the run configuration does not set one.
pub const DEFAULT_MAX_INSTRUCTIONS: usize = 100_000;

#[derive(Debug, Error)]
pub enum RamImageError {
    #[error("line {line}: {token:?} is not a cell value")]
    InvalidValue { line: usize, token: String },
    #[error("line {line}: {source}")]
    Cell {
        line: usize,
        #[source]
        source: CellError,
    },
    #[error("image holds {count} cells, RAM has {}", RAM_SIZE)]
    TooManyCells { count: usize },
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunConfig {
    #[builder(default = MicrocodeMode::Normal.program().clone())]
    pub microcode: MicrocodeProgram,
    #[builder(default = DEFAULT_MAX_INSTRUCTIONS)]
    pub max_instructions: usize,
    /// Log the per-instruction trace line at `debug` level.
    #[builder(default = true)]
    pub trace: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Halted,
    InstructionLimit,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub instructions: usize,
    pub stop: StopReason,
    pub state: CpuState,
}

/// Parse a RAM image: decimal cell values separated by whitespace, loaded
/// from address 0. Lines starting with `;` are comments.
pub fn parse_ram_image(text: &str) -> Result<[u32; RAM_SIZE], RamImageError> {
    let mut ram = [0; RAM_SIZE];
    let mut count = 0;
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.starts_with(';') {
            continue;
        }
        for token in line.split_whitespace() {
            let value: u32 = token.parse().map_err(|_| RamImageError::InvalidValue {
                line: line_no,
                token: token.to_string(),
            })?;
            decode_cell(value).map_err(|source| RamImageError::Cell {
                line: line_no,
                source,
            })?;
            if count < RAM_SIZE {
                ram[count] = value;
            }
            count += 1;
        }
    }
    if count > RAM_SIZE {
        return Err(RamImageError::TooManyCells { count });
    }
    Ok(ram)
}

fn trace_line(state: &CpuState) -> String {
    format!(
        "PC:{:03} IR:{:05} ACC:{:05} {}",
        state.pc,
        state.ir,
        state.acc,
        if state.halted { "HALT" } else { "OK" }
    )
}

/// Run `ram` under the configured microcode until the machine halts or the
/// instruction cap is reached.
pub fn run(config: &RunConfig, ram: [u32; RAM_SIZE]) -> RunSummary {
    let findings = config.microcode.validate_blocks();
    if !findings.is_empty() {
        log::info!("{} microcode block(s) may not terminate", findings.len());
    }

    let mut state = CpuState::new(&config.microcode).with_ram(ram);
    let mut instructions = 0;
    log::info!(
        "running {} macro-instructions, cap {}",
        config.microcode.operations().len(),
        config.max_instructions
    );

    while !state.halted {
        if instructions >= config.max_instructions {
            log::info!("instruction cap {} reached", config.max_instructions);
            return RunSummary {
                instructions,
                stop: StopReason::InstructionLimit,
                state,
            };
        }
        state = state.execute_instruction();
        instructions += 1;
        if config.trace {
            log::debug!("{}", trace_line(&state));
        }
    }

    log::info!("halted after {instructions} instructions");
    RunSummary {
        instructions,
        stop: StopReason::Halted,
        state,
    }
}
