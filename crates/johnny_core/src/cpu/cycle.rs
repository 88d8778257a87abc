use super::CpuState;
use crate::MAX_MICRO_STEPS_PER_INSTRUCTION;

impl CpuState {
    /// Run one whole macro-instruction: FETCH, dispatch, and the
    /// instruction's block up to its reset-counter micro-op.
    ///
    /// Returns once the micro-program counter is back at `0` or the machine
    /// halts. A block that never resets the counter is cut off after
    /// [`MAX_MICRO_STEPS_PER_INSTRUCTION`] micro-steps and the machine is
    /// halted.
    pub fn execute_instruction(&self) -> CpuState {
        let mut state = self.clone();
        if state.halted {
            return state;
        }

        let mut steps = 0;
        if state.mc_counter == 0 {
            // Leave the idle state; this is the first FETCH micro-op.
            state.advance();
            steps += 1;
        }

        while state.mc_counter != 0 && !state.halted {
            if steps >= MAX_MICRO_STEPS_PER_INSTRUCTION {
                log::warn!(
                    "instruction at pc={} did not finish within {} micro-steps (mc={}), halting",
                    self.pc,
                    MAX_MICRO_STEPS_PER_INSTRUCTION,
                    state.mc_counter
                );
                state.halted = true;
                break;
            }
            state.advance();
            steps += 1;
        }

        state
    }
}

/// Free-function form of [`CpuState::execute_instruction`].
pub fn execute_instruction(state: &CpuState) -> CpuState {
    state.execute_instruction()
}
