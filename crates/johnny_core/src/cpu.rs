mod cycle;
mod micro_op;
mod step;

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::microcode::{MicroWord, MicrocodeMode, MicrocodeProgram};
use crate::RAM_SIZE;

pub use cycle::execute_instruction;
pub use micro_op::{CounterAction, MicroOp};
pub use step::execute_micro_step;

lazy_static! {
    /// Zeroed registers, zeroed RAM and the `normal` microcode loaded.
    pub static ref CLEAN_CPU_STATE: CpuState = CpuState::new(MicrocodeMode::Normal.program());
}

/// Complete machine state.
///
/// Transitions never mutate a state in place: `execute_micro_step` and
/// `execute_instruction` return a new value. The microcode is shared behind
/// an `Arc`, so copying a state copies RAM and registers only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuState {
    pub ram: [u32; RAM_SIZE],
    /// Accumulator.
    pub acc: u32,
    /// Program counter.
    pub pc: u32,
    /// Instruction register.
    pub ir: u32,
    /// Data bus.
    pub db: u32,
    /// Address bus.
    pub ab: u32,
    /// Micro-program counter: index into `micro_code`. `0` means the
    /// machine is between macro-instructions.
    pub mc_counter: usize,
    /// Sticky; only a fresh state clears it.
    pub halted: bool,
    pub micro_code: Arc<[MicroWord]>,
}

/// Where the machine is in the instruction cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    MidCycle,
    Halted,
}

impl Default for CpuState {
    fn default() -> Self {
        CLEAN_CPU_STATE.clone()
    }
}

impl CpuState {
    pub fn new(program: &MicrocodeProgram) -> Self {
        Self {
            ram: [0; RAM_SIZE],
            acc: 0,
            pc: 0,
            ir: 0,
            db: 0,
            ab: 0,
            mc_counter: 0,
            halted: false,
            micro_code: program.flatten(),
        }
    }

    /// Replace the RAM image.
    pub fn with_ram(mut self, ram: [u32; RAM_SIZE]) -> Self {
        self.ram = ram;
        self
    }

    /// Load another microcode program. The micro-program counter restarts
    /// at the beginning of FETCH.
    pub fn with_program(mut self, program: &MicrocodeProgram) -> Self {
        self.micro_code = program.flatten();
        self.mc_counter = 0;
        self
    }

    /// A fresh state that keeps this state's RAM and microcode.
    pub fn reset(&self) -> Self {
        Self {
            acc: 0,
            pc: 0,
            ir: 0,
            db: 0,
            ab: 0,
            mc_counter: 0,
            halted: false,
            ..self.clone()
        }
    }

    pub fn phase(&self) -> Phase {
        if self.halted {
            Phase::Halted
        } else if self.mc_counter == 0 {
            Phase::Idle
        } else {
            Phase::MidCycle
        }
    }

    /// The slot the micro-program counter points at.
    pub fn current_word(&self) -> Option<&MicroWord> {
        self.micro_code.get(self.mc_counter)
    }

    /// The micro-op that the next micro-step would run, if it is known.
    pub fn current_micro_op(&self) -> Option<MicroOp> {
        self.current_word().and_then(MicroWord::micro_op)
    }

    /// Address bus outside RAM. Only reachable through direct field writes.
    fn bus_fault(&mut self, access: &str) {
        log::warn!(
            "bus {access} at address {} outside RAM, halting (mc={})",
            self.ab,
            self.mc_counter
        );
        self.halted = true;
    }
}
