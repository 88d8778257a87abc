use super::CpuState;
use crate::cell::{extract_data, extract_opcode};
use crate::{ACC_MAX, MICRO_SLOTS_PER_INSTRUCTION, RAM_SIZE};

/// How the micro-program counter moves after a micro-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterAction {
    /// Advance to the next slot.
    Increment,
    /// The micro-op itself sets the counter.
    Assign,
}

/// The fixed micro-op catalogue. Discriminants are the codes used in
/// microcode text; 0 and 6 are unassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MicroOp {
    /// `ram[ab] := db`
    DbToRam = 1,
    /// `db := ram[ab]`
    RamToDb = 2,
    /// `ir := db`
    DbToIr = 3,
    /// `ab := data(ir)`
    IrToAb = 4,
    /// `mc := opcode(ir) * 10`, dispatching into the instruction's block.
    IrToMc = 5,
    /// `mc := 0`, ending the macro-instruction.
    ResetMc = 7,
    /// `ab := pc`
    PcToAb = 8,
    /// `pc := pc + 1`
    IncPc = 9,
    /// `pc := pc + 1` if `acc == 0`
    SkipIfZero = 10,
    /// `pc := data(ir)`
    IrToPc = 11,
    /// `acc := 0`
    ZeroAcc = 12,
    /// `acc := min(acc + db, 999)`
    AddAcc = 13,
    /// `acc := max(acc - db, 0)`
    SubAcc = 14,
    /// `db := acc`
    AccToDb = 15,
    /// `acc := min(acc + 1, 999)`
    IncAcc = 16,
    /// `acc := max(acc - 1, 0)`
    DecAcc = 17,
    /// `acc := db`, a plain transfer; the next arithmetic op re-clamps.
    DbToAcc = 18,
    Halt = 19,
}

impl MicroOp {
    pub const ALL: [MicroOp; 18] = [
        MicroOp::DbToRam,
        MicroOp::RamToDb,
        MicroOp::DbToIr,
        MicroOp::IrToAb,
        MicroOp::IrToMc,
        MicroOp::ResetMc,
        MicroOp::PcToAb,
        MicroOp::IncPc,
        MicroOp::SkipIfZero,
        MicroOp::IrToPc,
        MicroOp::ZeroAcc,
        MicroOp::AddAcc,
        MicroOp::SubAcc,
        MicroOp::AccToDb,
        MicroOp::IncAcc,
        MicroOp::DecAcc,
        MicroOp::DbToAcc,
        MicroOp::Halt,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        let op = match code {
            1 => MicroOp::DbToRam,
            2 => MicroOp::RamToDb,
            3 => MicroOp::DbToIr,
            4 => MicroOp::IrToAb,
            5 => MicroOp::IrToMc,
            7 => MicroOp::ResetMc,
            8 => MicroOp::PcToAb,
            9 => MicroOp::IncPc,
            10 => MicroOp::SkipIfZero,
            11 => MicroOp::IrToPc,
            12 => MicroOp::ZeroAcc,
            13 => MicroOp::AddAcc,
            14 => MicroOp::SubAcc,
            15 => MicroOp::AccToDb,
            16 => MicroOp::IncAcc,
            17 => MicroOp::DecAcc,
            18 => MicroOp::DbToAcc,
            19 => MicroOp::Halt,
            _ => return None,
        };
        Some(op)
    }

    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn action(self) -> CounterAction {
        match self {
            MicroOp::IrToMc | MicroOp::ResetMc => CounterAction::Assign,
            _ => CounterAction::Increment,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            MicroOp::DbToRam => "db -> ram",
            MicroOp::RamToDb => "ram -> db",
            MicroOp::DbToIr => "db -> ir",
            MicroOp::IrToAb => "ir -> ab",
            MicroOp::IrToMc => "ir -> mc",
            MicroOp::ResetMc => "mc := 0",
            MicroOp::PcToAb => "pc -> ab",
            MicroOp::IncPc => "pc + 1 -> pc",
            MicroOp::SkipIfZero => "if acc = 0 then pc + 1",
            MicroOp::IrToPc => "ir -> pc",
            MicroOp::ZeroAcc => "acc := 0",
            MicroOp::AddAcc => "acc + db -> acc",
            MicroOp::SubAcc => "acc - db -> acc",
            MicroOp::AccToDb => "acc -> db",
            MicroOp::IncAcc => "acc + 1 -> acc",
            MicroOp::DecAcc => "acc - 1 -> acc",
            MicroOp::DbToAcc => "db -> acc",
            MicroOp::Halt => "halt",
        }
    }

    /// Apply this micro-op's register/memory transition to `s`.
    ///
    /// The micro-program counter is only touched by the two `Assign` ops;
    /// advancing it for the rest is the caller's job.
    pub(crate) fn apply(self, s: &mut CpuState) {
        match self {
            MicroOp::DbToRam => match s.ram.get_mut(s.ab as usize) {
                Some(cell) => *cell = s.db,
                None => s.bus_fault("write"),
            },
            MicroOp::RamToDb => match s.ram.get(s.ab as usize) {
                Some(&cell) => s.db = cell,
                None => s.bus_fault("read"),
            },
            MicroOp::DbToIr => s.ir = s.db,
            MicroOp::IrToAb => s.ab = extract_data(s.ir),
            MicroOp::IrToMc => {
                s.mc_counter = extract_opcode(s.ir) as usize * MICRO_SLOTS_PER_INSTRUCTION
            }
            MicroOp::ResetMc => s.mc_counter = 0,
            MicroOp::PcToAb => s.ab = s.pc,
            MicroOp::IncPc => s.pc = next_address(s.pc),
            MicroOp::SkipIfZero => {
                if s.acc == 0 {
                    s.pc = next_address(s.pc);
                }
            }
            MicroOp::IrToPc => s.pc = extract_data(s.ir),
            MicroOp::ZeroAcc => s.acc = 0,
            MicroOp::AddAcc => s.acc = s.acc.saturating_add(s.db).min(ACC_MAX),
            MicroOp::SubAcc => s.acc = s.acc.saturating_sub(s.db).min(ACC_MAX),
            MicroOp::AccToDb => s.db = s.acc,
            MicroOp::IncAcc => s.acc = s.acc.saturating_add(1).min(ACC_MAX),
            MicroOp::DecAcc => s.acc = s.acc.saturating_sub(1).min(ACC_MAX),
            MicroOp::DbToAcc => s.acc = s.db,
            MicroOp::Halt => s.halted = true,
        }
    }
}

/// The program counter is a three-digit address: 999 rolls over to 0.
#[inline]
fn next_address(pc: u32) -> u32 {
    pc.wrapping_add(1) % RAM_SIZE as u32
}
