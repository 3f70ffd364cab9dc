//! An algebraic VHDL intermediate representation, plus a deterministic
//! pretty-printer that renders it as VHDL-93 text (§4.6).
//!
//! Keeping this as structured data rather than assembling strings directly
//! lets the FSM and entity lowering passes (`crate::fsm`, `crate::assemble`)
//! be tested by inspecting fields instead of matching on emitted text.

use std::fmt;

/// Port direction, as VHDL spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::InOut => write!(f, "inout"),
        }
    }
}

/// A `std_logic` (width `None`) or `std_logic_vector(width-1 downto 0)`
/// (width `Some(n)`) port or signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub width: Option<u32>,
}

impl Port {
    pub fn new(name: impl Into<String>, direction: Direction, width: Option<u32>) -> Self {
        Port {
            name: name.into(),
            direction,
            width,
        }
    }
}

fn type_name(width: Option<u32>) -> String {
    match width {
        None => "std_logic".to_string(),
        Some(w) => format!("std_logic_vector({} downto 0)", w - 1),
    }
}

/// A signal declared in an architecture's declarative part.
///
/// Most signals are `std_logic`/`std_logic_vector` and carry a `width`; a
/// signal of a locally declared enumerated type (e.g. the FSM's
/// `current_state`) sets `type_name` instead and leaves `width` `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub width: Option<u32>,
    pub type_name: Option<String>,
}

impl Signal {
    pub fn new(name: impl Into<String>, width: Option<u32>) -> Self {
        Signal {
            name: name.into(),
            width,
            type_name: None,
        }
    }

    /// A signal of a locally declared enumerated type rather than
    /// `std_logic`/`std_logic_vector`.
    pub fn of_type(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Signal {
            name: name.into(),
            width: None,
            type_name: Some(type_name.into()),
        }
    }
}

/// A named constant of a given bit width, with its value already rendered
/// as a zero-padded MSB-first binary string (no quotes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub width: u32,
    pub binary_value: String,
}

/// Convert `value` to a zero-extended, MSB-first binary literal of exactly
/// `width` bits.
pub fn to_binary(value: u32, width: u32) -> String {
    format!("{:0width$b}", value, width = width as usize)
}

/// Wrap a binary literal in the correct VHDL quoting: single quotes for a
/// single bit, double quotes otherwise.
pub fn bit_literal(binary: &str) -> String {
    if binary.len() == 1 {
        format!("'{binary}'")
    } else {
        format!("\"{binary}\"")
    }
}

/// A declared component (an instantiable entity signature), e.g. `reg`,
/// `ram`, `alu`, or the generated `control_unit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDecl {
    pub name: String,
    /// `(generic name, VHDL type)` pairs, e.g. `("address_width", "integer")`.
    pub generics: Vec<(String, String)>,
    pub ports: Vec<Port>,
}

/// One component instantiation with a positional port map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub label: String,
    pub component: String,
    /// `(generic name, value)` pairs rendered as a `generic map (...)` clause
    /// before the port map; empty when the component takes no generics.
    pub generic_map: Vec<(String, String)>,
    pub port_map: Vec<String>,
}

/// A sequential statement, usable inside a process body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `target <= expr;`
    Assign { target: String, expr: String },
    /// `if cond then body [elsif cond then body]* [else body] end if;`
    If {
        branches: Vec<(String, Vec<Stmt>)>,
        otherwise: Option<Vec<Stmt>>,
    },
    /// `case expr is when choice => body ... [when others => body] end case;`
    Case {
        expr: String,
        arms: Vec<(String, Vec<Stmt>)>,
        others: Option<Vec<Stmt>>,
    },
    /// `null;` — the no-op statement, used to fill a `when others` arm of a
    /// case that has nothing to do for the unlisted choices.
    Null,
}

/// A process with an explicit sensitivity list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub label: Option<String>,
    pub sensitivity: Vec<String>,
    pub body: Vec<Stmt>,
}

/// One concurrent statement in an architecture body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Concurrent {
    Instance(Instance),
    /// `target <= expr;`
    Assign { target: String, expr: String },
    Process(Process),
}

/// `entity <name> is ... end <name>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub ports: Vec<Port>,
}

/// `architecture behavior of <entity> is ... begin ... end behavior;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Architecture {
    pub entity: String,
    pub signals: Vec<Signal>,
    pub constants: Vec<Constant>,
    /// Declared enumerated types, e.g. the FSM's state type: (type name, variants).
    pub types: Vec<(String, Vec<String>)>,
    pub components: Vec<ComponentDecl>,
    pub statements: Vec<Concurrent>,
}

/// A complete design unit: one entity and its one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Design {
    pub entity: Entity,
    pub architecture: Architecture,
}

const INDENT: &str = "    ";

fn write_indented(f: &mut fmt::Formatter<'_>, depth: usize, line: &str) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    writeln!(f, "{line}")
}

fn write_stmts(f: &mut fmt::Formatter<'_>, depth: usize, stmts: &[Stmt]) -> fmt::Result {
    for stmt in stmts {
        write_stmt(f, depth, stmt)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, depth: usize, stmt: &Stmt) -> fmt::Result {
    match stmt {
        Stmt::Assign { target, expr } => {
            write_indented(f, depth, &format!("{target} <= {expr};"))
        }
        Stmt::If { branches, otherwise } => {
            for (i, (cond, body)) in branches.iter().enumerate() {
                let kw = if i == 0 { "if" } else { "elsif" };
                write_indented(f, depth, &format!("{kw} {cond} then"))?;
                write_stmts(f, depth + 1, body)?;
            }
            if let Some(body) = otherwise {
                write_indented(f, depth, "else")?;
                write_stmts(f, depth + 1, body)?;
            }
            write_indented(f, depth, "end if;")
        }
        Stmt::Case { expr, arms, others } => {
            write_indented(f, depth, &format!("case {expr} is"))?;
            for (choice, body) in arms {
                write_indented(f, depth + 1, &format!("when {choice} =>"))?;
                write_stmts(f, depth + 2, body)?;
            }
            if let Some(body) = others {
                write_indented(f, depth + 1, "when others =>")?;
                write_stmts(f, depth + 2, body)?;
            }
            write_indented(f, depth, "end case;")
        }
        Stmt::Null => write_indented(f, depth, "null;"),
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "entity {} is", self.name)?;
        if !self.ports.is_empty() {
            write_indented(f, 1, "port (")?;
            for (i, port) in self.ports.iter().enumerate() {
                let sep = if i + 1 == self.ports.len() { "" } else { ";" };
                write_indented(
                    f,
                    2,
                    &format!(
                        "{} : {} {}{}",
                        port.name,
                        port.direction,
                        type_name(port.width),
                        sep
                    ),
                )?;
            }
            write_indented(f, 1, ");")?;
        }
        writeln!(f, "end {};", self.name)
    }
}

fn write_component(f: &mut fmt::Formatter<'_>, depth: usize, comp: &ComponentDecl) -> fmt::Result {
    write_indented(f, depth, &format!("component {}", comp.name))?;
    if !comp.generics.is_empty() {
        write_indented(f, depth + 1, "generic (")?;
        for (i, (name, ty)) in comp.generics.iter().enumerate() {
            let sep = if i + 1 == comp.generics.len() { "" } else { ";" };
            write_indented(f, depth + 2, &format!("{name} : {ty}{sep}"))?;
        }
        write_indented(f, depth + 1, ");")?;
    }
    if !comp.ports.is_empty() {
        write_indented(f, depth + 1, "port (")?;
        for (i, port) in comp.ports.iter().enumerate() {
            let sep = if i + 1 == comp.ports.len() { "" } else { ";" };
            write_indented(
                f,
                depth + 2,
                &format!(
                    "{} : {} {}{}",
                    port.name,
                    port.direction,
                    type_name(port.width),
                    sep
                ),
            )?;
        }
        write_indented(f, depth + 1, ");")?;
    }
    write_indented(f, depth, "end component;")
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "architecture behavior of {} is", self.entity)?;
        for (type_name, variants) in &self.types {
            write_indented(
                f,
                1,
                &format!("type {} is ({});", type_name, variants.join(", ")),
            )?;
        }
        for constant in &self.constants {
            write_indented(
                f,
                1,
                &format!(
                    "constant {} : std_logic_vector({} downto 0) := {};",
                    constant.name,
                    constant.width - 1,
                    bit_literal(&constant.binary_value)
                ),
            )?;
        }
        for signal in &self.signals {
            let ty = match &signal.type_name {
                Some(custom) => custom.clone(),
                None => type_name(signal.width),
            };
            write_indented(f, 1, &format!("signal {} : {};", signal.name, ty))?;
        }
        for comp in &self.components {
            write_component(f, 1, comp)?;
        }
        writeln!(f, "begin")?;
        for stmt in &self.statements {
            write_concurrent(f, 1, stmt)?;
        }
        writeln!(f, "end behavior;")
    }
}

fn write_concurrent(f: &mut fmt::Formatter<'_>, depth: usize, stmt: &Concurrent) -> fmt::Result {
    match stmt {
        Concurrent::Instance(inst) => {
            write_indented(
                f,
                depth,
                &format!("{}: {}", inst.label, inst.component),
            )?;
            if !inst.generic_map.is_empty() {
                let generics = inst
                    .generic_map
                    .iter()
                    .map(|(name, value)| format!("{name} => {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write_indented(f, depth + 1, &format!("generic map ({generics})"))?;
            }
            write_indented(f, depth + 1, &format!("port map ({});", inst.port_map.join(", ")))
        }
        Concurrent::Assign { target, expr } => {
            write_indented(f, depth, &format!("{target} <= {expr};"))
        }
        Concurrent::Process(process) => {
            let header = match &process.label {
                Some(label) => format!("{label}: process ({})", process.sensitivity.join(", ")),
                None => format!("process ({})", process.sensitivity.join(", ")),
            };
            write_indented(f, depth, &header)?;
            writeln!(f, "begin")?;
            write_stmts(f, depth + 1, &process.body)?;
            write_indented(f, depth, "end process;")
        }
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "library ieee;")?;
        writeln!(f, "use ieee.std_logic_1164.all;")?;
        writeln!(f)?;
        write!(f, "{}", self.entity)?;
        writeln!(f)?;
        write!(f, "{}", self.architecture)
    }
}
