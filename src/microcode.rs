//! RTL-to-microcode lowering (§4.1): a pure function from one [`Move`] to
//! an ordered sequence of [`MicrocodeState`]s.

use std::collections::BTreeSet;

use crate::rtl::{AluOp, Move, Operand, Source};

/// One cycle of the control FSM: the control signals asserted, the ALU
/// opcode (if any), the constant driven onto the bus (if any), and the
/// name of the successor state. `next` starts empty and is filled in by
/// [`crate::assemble`] once the full chain is known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MicrocodeState {
    pub signals: BTreeSet<String>,
    pub alu_op: Option<AluOp>,
    pub constant: Option<u8>,
    pub next: Option<String>,
}

impl MicrocodeState {
    fn with_signals(signals: impl IntoIterator<Item = String>) -> Self {
        MicrocodeState {
            signals: signals.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// Lower one RTL move into its microcode states, per §4.1.
///
/// - A constant source is a single state that asserts `wr_<target>` and
///   drives the constant onto the bus.
/// - A register source is a single state that asserts `wr_<target>` and
///   `rd_<source>`.
/// - An ALU source expands into two or three states: load the A input
///   (and the B input, for binary operations), then latch the ALU result
///   into the target.
pub fn lower_move(mv: &Move) -> Vec<MicrocodeState> {
    match &mv.source {
        Source::Const(value) => {
            let mut state = MicrocodeState::with_signals([mv.target.write_signal()]);
            state.constant = Some(*value as u8);
            vec![state]
        }
        Source::Reg(reg) => {
            vec![MicrocodeState::with_signals([
                mv.target.write_signal(),
                reg.read_signal(),
            ])]
        }
        Source::Alu(alu) => {
            let mut states = Vec::with_capacity(3);

            // 1. load the A input
            let a = &alu.operands[0];
            let mut load_a = match a {
                Operand::Reg(reg) => {
                    MicrocodeState::with_signals([reg.read_signal(), "wr_alu_a".to_string()])
                }
                Operand::Const(value) => {
                    let mut s = MicrocodeState::with_signals(["wr_alu_a".to_string()]);
                    s.constant = Some(*value as u8);
                    s
                }
            };
            load_a.alu_op = Some(alu.op);
            states.push(load_a);

            // 2. load the B input, for binary operations only
            if alu.operands.len() > 1 {
                let b = &alu.operands[1];
                let load_b = match b {
                    Operand::Reg(reg) => {
                        MicrocodeState::with_signals(["wr_alu_b".to_string(), reg.read_signal()])
                    }
                    Operand::Const(value) => {
                        let mut s = MicrocodeState::with_signals(["wr_alu_b".to_string()]);
                        s.constant = Some(*value as u8);
                        s
                    }
                };
                states.push(load_b);
            }

            // 3. latch the result into the target register
            let mut latch = MicrocodeState::with_signals([
                "rd_alu".to_string(),
                mv.target.write_signal(),
            ]);
            latch.alu_op = Some(alu.op);
            states.push(latch);

            states
        }
    }
}

/// Flatten an instruction's moves into one microcode chain. `next` links
/// are left empty here; [`crate::assemble`] names the states and threads
/// the chain together.
pub fn lower_moves(moves: &[Move]) -> Vec<MicrocodeState> {
    moves.iter().flat_map(lower_move).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtl::{add, complement, subtract, Instruction};

    #[test]
    fn constant_load_is_one_state() {
        let instr = Instruction::new("load_seven").move_("A", 7u8);
        let states = lower_moves(&instr.moves);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].constant, Some(7));
        assert!(states[0].signals.contains("wr_A"));
        assert_eq!(states[0].signals.len(), 1);
    }

    #[test]
    fn register_move_is_one_state() {
        let instr = Instruction::new("mov_a_pc").move_("A", "pc");
        let states = lower_moves(&instr.moves);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].constant, None);
        assert!(states[0].signals.contains("wr_A"));
        assert!(states[0].signals.contains("rd_pc"));
    }

    #[test]
    fn binary_alu_is_three_states() {
        let instr = Instruction::new("add_ab").move_("A", add("A", "B"));
        let states = lower_moves(&instr.moves);
        assert_eq!(states.len(), 3);

        assert!(states[0].signals.contains("rd_A"));
        assert!(states[0].signals.contains("wr_alu_a"));
        assert_eq!(states[0].alu_op, Some(AluOp::Add));

        assert!(states[1].signals.contains("wr_alu_b"));
        assert!(states[1].signals.contains("rd_B"));

        assert!(states[2].signals.contains("rd_alu"));
        assert!(states[2].signals.contains("wr_A"));
        assert_eq!(states[2].alu_op, Some(AluOp::Add));
    }

    #[test]
    fn unary_alu_is_two_states() {
        let instr = Instruction::new("neg_a").move_("A", complement("A"));
        let states = lower_moves(&instr.moves);
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].alu_op, Some(AluOp::Complement));
        assert_eq!(states[1].alu_op, Some(AluOp::Complement));
    }

    #[test]
    fn alu_constant_operand_drives_bus_not_a_signal() {
        let instr = Instruction::new("sub_const").move_("A", subtract("A", 3u8));
        let states = lower_moves(&instr.moves);
        assert_eq!(states.len(), 3);
        assert_eq!(states[1].constant, Some(3));
        assert!(!states[1]
            .signals
            .iter()
            .any(|s| s.starts_with("rd_") && s.contains('3')));
    }
}
