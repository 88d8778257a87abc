use super::{MicroWord, MicrocodeProgram};
use crate::MICRO_SLOTS_PER_INSTRUCTION;

/// One line of a microcode listing, as shown next to the control unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingRow {
    /// Three-digit position in the flattened microcode.
    pub address: String,
    /// `"NAME:"` on the first slot of a named macro-instruction, else empty.
    pub label: String,
    pub description: String,
}

/// Human-readable form of a slot. Unknown codes and invalid tokens are
/// shown as-is.
pub fn describe_micro_op(word: &MicroWord) -> String {
    match word.micro_op() {
        Some(op) => op.description().to_string(),
        None => word.to_string(),
    }
}

impl MicrocodeProgram {
    pub fn listing(&self) -> Vec<ListingRow> {
        self.flat
            .iter()
            .enumerate()
            .map(|(index, word)| {
                let label = if index % MICRO_SLOTS_PER_INSTRUCTION == 0 {
                    self.operation_name(index / MICRO_SLOTS_PER_INSTRUCTION)
                        .map(|name| format!("{name}:"))
                        .unwrap_or_default()
                } else {
                    String::new()
                };
                ListingRow {
                    address: format!("{index:03}"),
                    label,
                    description: describe_micro_op(word),
                }
            })
            .collect()
    }
}
