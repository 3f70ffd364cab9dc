//! The computer assembler (§4.2–4.4): merges per-instruction microcode
//! chains with the three fixed fetch/decode states, assigns opcodes,
//! derives the control-signal alphabet, and builds the control-FSM IR plus
//! the structural top-entity IR.

use crate::fsm::{equal, FallingEdgeLatch, Fsm, FsmPort, PortDirection, Reset, StateDef, Transition};
use crate::microcode::{lower_moves, MicrocodeState};
use crate::rtl::Computer;
use crate::vhdl::{
    bit_literal, to_binary, Architecture, Concurrent, ComponentDecl, Constant, Design, Direction,
    Entity, Port, Signal,
};

use crate::fsm::{instantiate, instantiate_with_generics};

/// The full reg/counter/ALU control-signal vocabulary the fixed datapath
/// wiring in [`build_top`] always needs a net for, whether or not any
/// instruction in this particular computer happens to assert it.
const STANDARD_SIGNALS: [&str; 13] = [
    "wr_pc", "rd_pc", "inc_pc", "wr_IR", "rd_IR", "wr_A", "rd_A", "wr_MD", "wr_MA", "rd_MD",
    "wr_alu_a", "wr_alu_b", "rd_alu",
];

/// Both VHDL designs produced from one [`Computer`]: the control FSM and the
/// structural top entity that instantiates it.
pub struct Assembled {
    pub control: Fsm,
    pub top: Design,
}

/// ⌈log₂ N⌉, with a floor of 1 bit (so a single-instruction computer, which
/// has nothing to distinguish, still gets an addressable opcode — see S1).
fn opcode_width(instruction_count: usize) -> u32 {
    if instruction_count <= 1 {
        return 1;
    }
    usize::BITS - (instruction_count - 1).leading_zeros()
}

/// Run the full assembly pipeline (§4.2) over an already-[`Computer::validate`]d
/// computer.
pub fn assemble(computer: &Computer) -> Assembled {
    let opcode_length = opcode_width(computer.instructions.len());

    let mut states = fixed_states();
    let mut opcode_edges = Vec::with_capacity(computer.instructions.len());

    for (idx, instr) in computer.instructions.iter().enumerate() {
        let mut chain = lower_moves(&instr.moves);
        if chain.is_empty() {
            // An instruction with no moves still needs one reachable state
            // so decode always has somewhere to guard to (§4.2 step 1, S1).
            chain.push(MicrocodeState::default());
        }
        let len = chain.len();
        for (i, mut state) in chain.into_iter().enumerate() {
            state.next = Some(if i + 1 < len {
                format!("{}_{}", instr.name, i + 1)
            } else {
                "fetch".to_string()
            });
            states.push((format!("{}_{}", instr.name, i), state));
        }
        let opcode = to_binary(idx as u32, opcode_length);
        opcode_edges.push((opcode, format!("{}_0", instr.name)));
    }

    let alphabet = control_alphabet(&states);
    let constants = bus_constants(&states);

    let state_defs = states
        .iter()
        .map(|(name, state)| state_def(name, state, &alphabet))
        .collect();

    let reset = build_reset(&alphabet);
    let transitions = build_transitions(&states, &opcode_edges);
    let falling_edge = vec![opcode_capture_latch(opcode_length)];

    let control = Fsm {
        name: "control_unit".to_string(),
        inputs: vec![
            FsmPort::new("clock", PortDirection::In, None),
            FsmPort::new("reset", PortDirection::In, None),
        ],
        outputs: std::iter::once(FsmPort::new("alu_operation", PortDirection::Out, Some(3)))
            .chain(alphabet.iter().map(|s| FsmPort::new(s.clone(), PortDirection::Out, None)))
            .collect(),
        inouts: vec![FsmPort::new("system_bus", PortDirection::InOut, Some(8))],
        internal_signals: vec![Signal::new("opcode", Some(opcode_length))],
        constants,
        states: state_defs,
        reset,
        transitions,
        falling_edge,
    };

    let top = build_top(computer, &alphabet);

    Assembled { control, top }
}

fn fixed_states() -> Vec<(String, MicrocodeState)> {
    let mut fetch = MicrocodeState {
        signals: ["rd_pc".to_string(), "wr_MA".to_string()].into_iter().collect(),
        ..Default::default()
    };
    fetch.next = Some("store_instruction".to_string());

    let mut store_instruction = MicrocodeState {
        signals: ["rd_MD".to_string(), "wr_IR".to_string(), "inc_pc".to_string()]
            .into_iter()
            .collect(),
        ..Default::default()
    };
    store_instruction.next = Some("decode".to_string());

    // `decode` asserts nothing and has no unconditional `next`: it only
    // leaves via the opcode-guarded edges added in `build_transitions`.
    let decode = MicrocodeState::default();

    vec![
        ("fetch".to_string(), fetch),
        ("store_instruction".to_string(), store_instruction),
        ("decode".to_string(), decode),
    ]
}

/// The union of every signal asserted anywhere, in order of first mention
/// (§4.5: "control signals appear in the order of first mention across the
/// full state set").
fn control_alphabet(states: &[(String, MicrocodeState)]) -> Vec<String> {
    let mut alphabet = Vec::new();
    for (_, state) in states {
        for signal in &state.signals {
            if !alphabet.contains(signal) {
                alphabet.push(signal.clone());
            }
        }
    }
    alphabet
}

/// One `CONSTANT_<n>` declaration per distinct value driven onto the bus,
/// in order of first mention.
fn bus_constants(states: &[(String, MicrocodeState)]) -> Vec<Constant> {
    let mut seen = Vec::new();
    for (_, state) in states {
        if let Some(value) = state.constant {
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
    }
    seen.into_iter()
        .map(|value| Constant {
            name: format!("CONSTANT_{value}"),
            width: 8,
            binary_value: to_binary(value as u32, 8),
        })
        .collect()
}

fn state_def(name: &str, state: &MicrocodeState, alphabet: &[String]) -> StateDef {
    let mut assignments: Vec<(String, String)> = alphabet
        .iter()
        .map(|signal| {
            let bit = if state.signals.contains(signal) { "1" } else { "0" };
            (signal.clone(), bit_literal(bit))
        })
        .collect();

    assignments.push((
        "alu_operation".to_string(),
        bit_literal(state.alu_op.map(|op| op.opcode()).unwrap_or("000")),
    ));

    let bus_expr = match state.constant {
        Some(value) => format!("CONSTANT_{value}"),
        None => "\"ZZZZZZZZ\"".to_string(),
    };
    assignments.push(("system_bus".to_string(), bus_expr));

    StateDef {
        name: name.to_string(),
        assignments,
    }
}

fn build_reset(alphabet: &[String]) -> Reset {
    let mut assignments: Vec<(String, String)> = alphabet
        .iter()
        .map(|signal| (signal.clone(), bit_literal("0")))
        .collect();
    assignments.push(("alu_operation".to_string(), bit_literal("000")));
    assignments.push(("system_bus".to_string(), "\"ZZZZZZZZ\"".to_string()));
    Reset {
        target: "fetch".to_string(),
        assignments,
    }
}

fn build_transitions(
    states: &[(String, MicrocodeState)],
    opcode_edges: &[(String, String)],
) -> Vec<Transition> {
    let mut transitions: Vec<Transition> = states
        .iter()
        .filter_map(|(name, state)| {
            state.next.as_ref().map(|next| Transition {
                from: name.clone(),
                to: next.clone(),
                guard: None,
            })
        })
        .collect();

    for (opcode, target) in opcode_edges {
        transitions.push(Transition {
            from: "decode".to_string(),
            to: target.clone(),
            guard: Some(equal("opcode", opcode)),
        });
    }

    transitions
}

fn opcode_capture_latch(opcode_length: u32) -> FallingEdgeLatch {
    let hi = 7;
    let lo = 8 - opcode_length;
    FallingEdgeLatch {
        state: "store_instruction".to_string(),
        assignments: vec![(
            format!("opcode({} downto 0)", opcode_length - 1),
            format!("system_bus({hi} downto {lo})"),
        )],
    }
}

/// Build the structural top entity (§4.4): five fixed datapath components
/// plus the just-generated control unit, wired over one shared system bus.
///
/// The fixed wiring below references the full standard register vocabulary
/// (`wr_pc`, `rd_A`, ...) regardless of whether this particular computer's
/// instructions happen to assert all of them; any name the control unit
/// doesn't actually drive (because it's absent from `alphabet`) is tied low
/// by a concurrent default assignment so `main.vhdl` stays self-contained.
fn build_top(computer: &Computer, alphabet: &[String]) -> Design {
    let entity = Entity {
        name: computer.name.clone(),
        ports: vec![
            Port::new("clock", Direction::In, None),
            Port::new("reset", Direction::In, None),
            Port::new("bus_inspection", Direction::Out, Some(8)),
        ],
    };

    let mut control_signal_names: Vec<String> =
        STANDARD_SIGNALS.iter().map(|s| s.to_string()).collect();
    for signal in alphabet {
        if !control_signal_names.contains(signal) {
            control_signal_names.push(signal.clone());
        }
    }

    let mut signals = vec![
        Signal::new("system_bus", Some(8)),
        Signal::new("alu_operation", Some(3)),
    ];
    signals.extend(
        control_signal_names
            .iter()
            .map(|name| Signal::new(name.clone(), None)),
    );

    let components = vec![
        ComponentDecl {
            name: "program_counter".to_string(),
            generics: Vec::new(),
            ports: vec![
                Port::new("clock", Direction::In, None),
                Port::new("data_in", Direction::In, Some(8)),
                Port::new("data_out", Direction::Out, Some(8)),
                Port::new("wr", Direction::In, None),
                Port::new("rd", Direction::In, None),
                Port::new("inc", Direction::In, None),
            ],
        },
        ComponentDecl {
            name: "reg".to_string(),
            generics: Vec::new(),
            ports: vec![
                Port::new("clock", Direction::In, None),
                Port::new("data_in", Direction::In, Some(8)),
                Port::new("data_out", Direction::Out, Some(8)),
                Port::new("wr", Direction::In, None),
                Port::new("rd", Direction::In, None),
            ],
        },
        ComponentDecl {
            name: "ram".to_string(),
            generics: vec![("address_width".to_string(), "integer".to_string())],
            ports: vec![
                Port::new("clock", Direction::In, None),
                Port::new("data_in", Direction::In, Some(8)),
                Port::new("data_out", Direction::Out, Some(8)),
                Port::new("address", Direction::In, Some(computer.address_width)),
                Port::new("wr_data", Direction::In, None),
                Port::new("wr_addr", Direction::In, None),
                Port::new("rd", Direction::In, None),
            ],
        },
        ComponentDecl {
            name: "alu".to_string(),
            generics: Vec::new(),
            ports: vec![
                Port::new("clock", Direction::In, None),
                Port::new("data_in", Direction::In, Some(8)),
                Port::new("data_out", Direction::Out, Some(8)),
                Port::new("op", Direction::In, Some(3)),
                Port::new("wr_a", Direction::In, None),
                Port::new("wr_b", Direction::In, None),
                Port::new("rd", Direction::In, None),
            ],
        },
        ComponentDecl {
            name: "control_unit".to_string(),
            generics: Vec::new(),
            ports: std::iter::once(Port::new("clock", Direction::In, None))
                .chain(std::iter::once(Port::new("reset", Direction::In, None)))
                .chain(std::iter::once(Port::new(
                    "system_bus",
                    Direction::InOut,
                    Some(8),
                )))
                .chain(std::iter::once(Port::new(
                    "alu_operation",
                    Direction::Out,
                    Some(3),
                )))
                .chain(alphabet.iter().map(|s| Port::new(s.clone(), Direction::Out, None)))
                .collect(),
        },
    ];

    let mut statements = vec![
        instantiate(
            "pc",
            "program_counter",
            vec![
                "clock".to_string(),
                "system_bus".to_string(),
                "system_bus".to_string(),
                "wr_pc".to_string(),
                "rd_pc".to_string(),
                "inc_pc".to_string(),
            ],
        ),
        instantiate(
            "ir",
            "reg",
            vec![
                "clock".to_string(),
                "system_bus".to_string(),
                "system_bus".to_string(),
                "wr_IR".to_string(),
                "rd_IR".to_string(),
            ],
        ),
        instantiate(
            "A",
            "reg",
            vec![
                "clock".to_string(),
                "system_bus".to_string(),
                "system_bus".to_string(),
                "wr_A".to_string(),
                "rd_A".to_string(),
            ],
        ),
        instantiate_with_generics(
            "main_memory",
            "ram",
            vec![("address_width".to_string(), computer.address_width.to_string())],
            vec![
                "clock".to_string(),
                "system_bus".to_string(),
                "system_bus".to_string(),
                format!("system_bus({} downto 0)", computer.address_width - 1),
                "wr_MD".to_string(),
                "wr_MA".to_string(),
                "rd_MD".to_string(),
            ],
        ),
        instantiate(
            "alu0",
            "alu",
            vec![
                "clock".to_string(),
                "system_bus".to_string(),
                "system_bus".to_string(),
                "alu_operation".to_string(),
                "wr_alu_a".to_string(),
                "wr_alu_b".to_string(),
                "rd_alu".to_string(),
            ],
        ),
    ];

    let mut control_port_map = vec![
        "clock".to_string(),
        "reset".to_string(),
        "system_bus".to_string(),
        "alu_operation".to_string(),
    ];
    control_port_map.extend(alphabet.iter().cloned());
    statements.push(instantiate("control0", "control_unit", control_port_map));

    for name in &control_signal_names {
        if !alphabet.contains(name) {
            statements.push(Concurrent::Assign {
                target: name.clone(),
                expr: "'0'".to_string(),
            });
        }
    }

    statements.push(Concurrent::Assign {
        target: "bus_inspection".to_string(),
        expr: "system_bus".to_string(),
    });

    Design {
        entity,
        architecture: Architecture {
            entity: computer.name.clone(),
            signals,
            constants: Vec::new(),
            types: Vec::new(),
            components,
            statements,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtl::{add, complement, subtract, Computer, Instruction};

    #[test]
    fn opcode_width_matches_examples() {
        assert_eq!(opcode_width(1), 1);
        assert_eq!(opcode_width(2), 1);
        assert_eq!(opcode_width(3), 2);
        assert_eq!(opcode_width(4), 2);
        assert_eq!(opcode_width(5), 3);
    }

    #[test]
    fn s1_nop_synthesizes_one_reachable_state() {
        let computer = Computer::new("s1").instruction(Instruction::new("nop"));
        let assembled = assemble(&computer);
        assert!(assembled
            .control
            .states
            .iter()
            .any(|s| s.name == "nop_0"));
    }

    #[test]
    fn s2_constant_load_declares_constant_and_drives_bus() {
        let computer =
            Computer::new("s2").instruction(Instruction::new("load_seven").move_("A", 7u8));
        let assembled = assemble(&computer);
        assert_eq!(assembled.control.constants.len(), 1);
        assert_eq!(assembled.control.constants[0].name, "CONSTANT_7");
        assert_eq!(assembled.control.constants[0].binary_value, "00000111");

        let state = assembled
            .control
            .states
            .iter()
            .find(|s| s.name == "load_seven_0")
            .unwrap();
        assert!(state
            .assignments
            .contains(&("system_bus".to_string(), "CONSTANT_7".to_string())));
    }

    #[test]
    fn s3_register_move_leaves_bus_high_z() {
        let computer =
            Computer::new("s3").instruction(Instruction::new("mov_a_pc").move_("A", "pc"));
        let assembled = assemble(&computer);
        let state = assembled
            .control
            .states
            .iter()
            .find(|s| s.name == "mov_a_pc_0")
            .unwrap();
        assert!(state
            .assignments
            .contains(&("system_bus".to_string(), "\"ZZZZZZZZ\"".to_string())));
    }

    #[test]
    fn s4_binary_alu_emits_three_states() {
        let computer =
            Computer::new("s4").instruction(Instruction::new("add_ab").move_("A", add("A", "B")));
        let assembled = assemble(&computer);
        let names: Vec<_> = assembled
            .control
            .states
            .iter()
            .map(|s| s.name.as_str())
            .filter(|n| n.starts_with("add_ab"))
            .collect();
        assert_eq!(names, vec!["add_ab_0", "add_ab_1", "add_ab_2"]);
    }

    #[test]
    fn s5_decode_guards_one_edge_per_instruction() {
        let computer = Computer::new("s5")
            .instruction(Instruction::new("inst_a").move_("A", 1u8))
            .instruction(Instruction::new("inst_b").move_("A", 2u8));
        let assembled = assemble(&computer);
        let decode_edges: Vec<_> = assembled
            .control
            .transitions
            .iter()
            .filter(|t| t.from == "decode")
            .collect();
        assert_eq!(decode_edges.len(), 2);
        assert!(decode_edges
            .iter()
            .any(|t| t.guard.as_deref() == Some("opcode = '0'") && t.to == "inst_a_0"));
        assert!(decode_edges
            .iter()
            .any(|t| t.guard.as_deref() == Some("opcode = '1'") && t.to == "inst_b_0"));
    }

    #[test]
    fn s6_opcode_capture_slices_the_bus() {
        let computer = Computer::new("s6")
            .instruction(Instruction::new("a"))
            .instruction(Instruction::new("b"))
            .instruction(Instruction::new("c"));
        let assembled = assemble(&computer);
        let latch = &assembled.control.falling_edge[0];
        assert_eq!(latch.state, "store_instruction");
        assert_eq!(latch.assignments[0].0, "opcode(1 downto 0)");
        assert_eq!(latch.assignments[0].1, "system_bus(7 downto 6)");
    }

    #[test]
    fn every_state_assigns_every_control_signal_exactly_once() {
        let computer = Computer::new("t")
            .instruction(Instruction::new("neg").move_("A", complement("A")))
            .instruction(Instruction::new("sub").move_("A", subtract("A", "B")));
        let assembled = assemble(&computer);
        let alphabet_size = assembled.control.outputs.len() - 1; // minus alu_operation
        for state in &assembled.control.states {
            let control_signal_assignments = state.assignments.len() - 2; // alu_operation, system_bus
            assert_eq!(control_signal_assignments, alphabet_size);
        }
    }

    #[test]
    fn reset_drives_every_signal_low() {
        let computer = Computer::new("r").instruction(Instruction::new("nop"));
        let assembled = assemble(&computer);
        assert!(assembled
            .control
            .reset
            .assignments
            .iter()
            .all(|(_, expr)| expr == "'0'" || expr == "\"000\"" || expr == "\"ZZZZZZZZ\""));
        assert_eq!(assembled.control.reset.target, "fetch");
    }

    #[test]
    fn top_instantiates_exactly_one_control_unit() {
        let computer = Computer::new("top").instruction(Instruction::new("nop"));
        let assembled = assemble(&computer);
        let count = assembled
            .top
            .architecture
            .statements
            .iter()
            .filter(|stmt| matches!(stmt, Concurrent::Instance(i) if i.component == "control_unit"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn top_ties_off_unused_standard_signals() {
        let computer = Computer::new("nop").instruction(Instruction::new("nop"));
        let assembled = assemble(&computer);
        let text = assembled.top.to_string();
        assert!(text.contains("wr_A <= '0';"));
    }

    #[test]
    fn top_maps_the_ram_address_width_generic_for_non_default_widths() {
        let computer = Computer::new("wide_ram")
            .address_width(7)
            .instruction(Instruction::new("nop"));
        let assembled = assemble(&computer);
        let text = assembled.top.to_string();
        assert!(text.contains("generic map (address_width => 7)"));
        assert!(text.contains("system_bus(6 downto 0)"));
    }
}
