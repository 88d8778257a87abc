use super::{CounterAction, CpuState, MicroOp};

impl CpuState {
    /// Run the micro-op under the micro-program counter and return the
    /// resulting state.
    ///
    /// An unknown or invalid slot (including a counter past the end of the
    /// microcode) halts the machine instead of failing. A halted state is
    /// returned unchanged.
    pub fn execute_micro_step(&self) -> CpuState {
        let mut next = self.clone();
        next.advance();
        next
    }

    /// Apply a single micro-op outside the micro program, as the front panel
    /// buttons do. Registers change exactly as they would under microcode
    /// (same clamping), but the micro-program counter is left alone.
    pub fn apply_manual(&self, op: MicroOp) -> CpuState {
        let mut next = self.clone();
        op.apply(&mut next);
        next.mc_counter = self.mc_counter;
        next
    }

    /// In-place micro-step used by the instruction driver on its own copy.
    pub(super) fn advance(&mut self) {
        if self.halted {
            return;
        }
        let mc = self.mc_counter;
        let Some(op) = self.current_micro_op() else {
            log::warn!(
                "unknown micro-op {} at mc={mc}, halting",
                self.current_word()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "<end of microcode>".to_string())
            );
            self.halted = true;
            return;
        };

        op.apply(self);
        if op.action() == CounterAction::Increment {
            self.mc_counter = mc + 1;
        }

        log::trace!(
            "mc={mc:03} op={:02} ({}) acc={} pc={} ir={} db={} ab={} -> mc={}",
            op.code(),
            op.description(),
            self.acc,
            self.pc,
            self.ir,
            self.db,
            self.ab,
            self.mc_counter
        );
    }
}

/// Free-function form of [`CpuState::execute_micro_step`].
pub fn execute_micro_step(state: &CpuState) -> CpuState {
    state.execute_micro_step()
}
