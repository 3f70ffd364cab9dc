//! The control-FSM intermediate representation (§3, §4.3) and its lowering
//! to VHDL (§4.5).
//!
//! This module knows nothing about RTL moves or microcode; it is a generic
//! Moore/hybrid state machine model. [`crate::assemble`] is what builds one
//! from a [`crate::rtl::Computer`].

use crate::vhdl::{
    bit_literal, Architecture, Concurrent, Constant, Design, Direction, Entity, Instance, Port,
    Process, Signal, Stmt,
};

/// One state's concurrent output assignments: `signal -> literal expr`
/// (already rendered, e.g. `"'1'"` or `"\"000\""`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDef {
    pub name: String,
    pub assignments: Vec<(String, String)>,
}

/// The reset block: the state entered on `reset = '1'`, plus the initial
/// assignments applied at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reset {
    pub target: String,
    pub assignments: Vec<(String, String)>,
}

/// An edge out of `from`. `guard` is `None` for an unconditional `next`
/// and `Some(expr)` for a decode-style guarded edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub guard: Option<String>,
}

/// Assignments latched on the falling edge of the clock while in a given
/// state (only `store_instruction`'s opcode capture uses this, per §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallingEdgeLatch {
    pub state: String,
    pub assignments: Vec<(String, String)>,
}

/// The control FSM's full intermediate representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fsm {
    pub name: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub inouts: Vec<Port>,
    pub internal_signals: Vec<Signal>,
    pub constants: Vec<Constant>,
    /// States in declaration order; this is also the order their `case`
    /// arms appear in the emitted output process.
    pub states: Vec<StateDef>,
    pub reset: Reset,
    /// Transitions grouped by source state are tried in declaration order;
    /// the first matching guard (or the unconditional edge) fires.
    pub transitions: Vec<Transition>,
    pub falling_edge: Vec<FallingEdgeLatch>,
}

fn state_names(states: &[StateDef]) -> Vec<String> {
    states.iter().map(|s| s.name.clone()).collect()
}

fn transitions_from<'a>(transitions: &'a [Transition], state: &str) -> Vec<&'a Transition> {
    transitions.iter().filter(|t| t.from == state).collect()
}

impl Fsm {
    /// Lower the FSM IR into a VHDL [`Design`] (§4.5): an enumerated state
    /// type, a clocked state-register process (reset, rising-edge
    /// transitions, falling-edge latches), and a combinational process that
    /// assigns every declared output per the current state.
    pub fn to_vhdl(&self) -> Design {
        // Declaration order doubles as the positional port-map order used
        // wherever this entity is instantiated (§4.4), so inputs (clock,
        // reset), then the inout system bus, then the outputs (ALU opcode,
        // control signals) is load-bearing, not cosmetic.
        let entity = Entity {
            name: self.name.clone(),
            ports: self
                .inputs
                .iter()
                .cloned()
                .chain(self.inouts.iter().cloned())
                .chain(self.outputs.iter().cloned())
                .collect(),
        };

        let state_type_name = "state_t".to_string();
        let mut signals = self.internal_signals.clone();
        signals.push(Signal::of_type("current_state", state_type_name.clone()));

        let state_type = (state_type_name, state_names(&self.states));

        let clocked_process = self.build_clocked_process();
        let output_process = self.build_output_process();

        let architecture = Architecture {
            entity: self.name.clone(),
            signals,
            constants: self.constants.clone(),
            types: vec![state_type],
            components: Vec::new(),
            statements: vec![
                Concurrent::Process(clocked_process),
                Concurrent::Process(output_process),
            ],
        };

        Design { entity, architecture }
    }

    fn build_clocked_process(&self) -> Process {
        let mut reset_body: Vec<Stmt> = self
            .reset
            .assignments
            .iter()
            .map(|(sig, expr)| Stmt::Assign {
                target: sig.clone(),
                expr: expr.clone(),
            })
            .collect();
        reset_body.push(Stmt::Assign {
            target: "current_state".to_string(),
            expr: self.reset.target.clone(),
        });

        let rising_case_arms: Vec<(String, Vec<Stmt>)> = self
            .states
            .iter()
            .map(|state| {
                let outgoing = transitions_from(&self.transitions, &state.name);
                let body = self.transition_body(&outgoing);
                (state.name.clone(), body)
            })
            .collect();

        let rising_body = vec![Stmt::Case {
            expr: "current_state".to_string(),
            arms: rising_case_arms,
            others: None,
        }];

        let falling_arms: Vec<(String, Vec<Stmt>)> = self
            .falling_edge
            .iter()
            .map(|latch| {
                let body = latch
                    .assignments
                    .iter()
                    .map(|(sig, expr)| Stmt::Assign {
                        target: sig.clone(),
                        expr: expr.clone(),
                    })
                    .collect();
                (latch.state.clone(), body)
            })
            .collect();

        let mut branches = vec![
            ("reset = '1'".to_string(), reset_body),
            ("clock'event and clock = '1'".to_string(), rising_body),
        ];
        if !falling_arms.is_empty() {
            branches.push((
                "clock'event and clock = '0'".to_string(),
                vec![Stmt::Case {
                    expr: "current_state".to_string(),
                    arms: falling_arms,
                    others: Some(vec![Stmt::Null]),
                }],
            ));
        }

        Process {
            label: None,
            sensitivity: vec!["clock".to_string(), "reset".to_string()],
            body: vec![Stmt::If {
                branches,
                otherwise: None,
            }],
        }
    }

    /// Build the body of one `case current_state is when <state> => ...`
    /// arm of the state-register process: an unconditional assignment for
    /// a plain `next`, or an if/elsif guard chain for decode-style edges.
    fn transition_body(&self, outgoing: &[&Transition]) -> Vec<Stmt> {
        if outgoing.is_empty() {
            return Vec::new();
        }
        if outgoing.len() == 1 && outgoing[0].guard.is_none() {
            return vec![Stmt::Assign {
                target: "current_state".to_string(),
                expr: outgoing[0].to.clone(),
            }];
        }
        let branches = outgoing
            .iter()
            .map(|t| {
                let guard = t
                    .guard
                    .clone()
                    .unwrap_or_else(|| "true".to_string());
                (
                    guard,
                    vec![Stmt::Assign {
                        target: "current_state".to_string(),
                        expr: t.to.clone(),
                    }],
                )
            })
            .collect();
        vec![Stmt::If {
            branches,
            otherwise: None,
        }]
    }

    fn build_output_process(&self) -> Process {
        let arms = self
            .states
            .iter()
            .map(|state| {
                let body = state
                    .assignments
                    .iter()
                    .map(|(sig, expr)| Stmt::Assign {
                        target: sig.clone(),
                        expr: expr.clone(),
                    })
                    .collect();
                (state.name.clone(), body)
            })
            .collect();

        Process {
            label: None,
            sensitivity: vec!["current_state".to_string()],
            body: vec![Stmt::Case {
                expr: "current_state".to_string(),
                arms,
                others: None,
            }],
        }
    }
}

/// `equal(signal, literal)` — the guard-building primitive named in §4.5,
/// rendered as a VHDL comparison expression.
pub fn equal(signal: &str, literal: &str) -> String {
    format!("{signal} = {}", bit_literal(literal))
}

/// Build a positional component instantiation statement.
pub fn instantiate(label: &str, component: &str, port_map: Vec<String>) -> Concurrent {
    Concurrent::Instance(Instance {
        label: label.to_string(),
        component: component.to_string(),
        generic_map: Vec::new(),
        port_map,
    })
}

/// As [`instantiate`], but with an explicit `generic map (...)` clause.
pub fn instantiate_with_generics(
    label: &str,
    component: &str,
    generic_map: Vec<(String, String)>,
    port_map: Vec<String>,
) -> Concurrent {
    Concurrent::Instance(Instance {
        label: label.to_string(),
        component: component.to_string(),
        generic_map,
        port_map,
    })
}

pub use crate::vhdl::Port as FsmPort;
pub use Direction as PortDirection;
