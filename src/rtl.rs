//! The RTL data model: registers, moves, ALU operations, instructions and
//! the top-level [`Computer`] the DSL facade ([`crate::dsl`]) builds up.
//!
//! Everything here is a pure, inert value. Nothing in this module touches
//! microcode, VHDL, or I/O; [`crate::microcode`] is the pure function from
//! this model to microcode states.

use crate::error::{GenError, Result};

/// A register identifier usable as a move target or source.
///
/// The seven names fixed by the instruction set are distinguished variants
/// so the lowering code in [`crate::microcode`] can match on them directly;
/// [`Register::Custom`] keeps the vocabulary open for registers a user adds
/// (the glossary's "any user-visible register added later").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Register {
    Pc,
    Ir,
    A,
    Md,
    Ma,
    AluA,
    AluB,
    Custom(String),
}

impl Register {
    /// The identifier as it appears in signal names and VHDL text.
    pub fn name(&self) -> &str {
        match self {
            Register::Pc => "pc",
            Register::Ir => "IR",
            Register::A => "A",
            Register::Md => "MD",
            Register::Ma => "MA",
            Register::AluA => "alu_a",
            Register::AluB => "alu_b",
            Register::Custom(name) => name,
        }
    }

    /// The `wr_<reg>` control signal that writes this register from the bus.
    pub fn write_signal(&self) -> String {
        format!("wr_{}", self.name())
    }

    /// The `rd_<reg>` control signal that drives this register onto the bus.
    pub fn read_signal(&self) -> String {
        format!("rd_{}", self.name())
    }
}

impl From<&str> for Register {
    fn from(value: &str) -> Self {
        match value {
            "pc" => Register::Pc,
            "IR" => Register::Ir,
            "A" => Register::A,
            "MD" => Register::Md,
            "MA" => Register::Ma,
            "alu_a" => Register::AluA,
            "alu_b" => Register::AluB,
            other => Register::Custom(other.to_string()),
        }
    }
}

impl From<String> for Register {
    fn from(value: String) -> Self {
        Register::from(value.as_str())
    }
}

/// A valid VHDL-93 identifier: starts with a letter, then letters, digits
/// or underscores.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_register(reg: &Register) -> Result<()> {
    if let Register::Custom(name) = reg {
        if !is_valid_identifier(name) {
            return Err(GenError::UnknownRegister(name.clone()));
        }
    }
    Ok(())
}

pub(crate) fn check_constant(value: i64) -> Result<u8> {
    if !(0..=255).contains(&value) {
        return Err(GenError::ConstantOutOfRange(value));
    }
    Ok(value as u8)
}

/// One fixed ALU opcode, per §3: `complement = 101`, `add = 010`,
/// `subtract = 110`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Complement,
    Add,
    Subtract,
}

impl AluOp {
    /// The fixed 3-bit opcode, MSB-first.
    pub fn opcode(self) -> &'static str {
        match self {
            AluOp::Complement => "101",
            AluOp::Add => "010",
            AluOp::Subtract => "110",
        }
    }
}

/// An operand to an [`AluOperation`]: either an integer constant (driven
/// onto the bus) or a register (read onto the bus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// An integer constant, checked against 0..=255 during [`Computer::validate`].
    Const(i64),
    Reg(Register),
}

/// Anything that can be assigned as the source of an RTL move.
impl From<Register> for Operand {
    fn from(value: Register) -> Self {
        Operand::Reg(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Reg(Register::from(value))
    }
}

impl From<u8> for Operand {
    fn from(value: u8) -> Self {
        Operand::Const(value as i64)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Const(value as i64)
    }
}

/// An ALU computation: one opcode plus its one (complement) or two (add,
/// subtract) operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AluOperation {
    pub op: AluOp,
    pub operands: Vec<Operand>,
}

/// `complement(a)` — the one-operand ALU operation.
pub fn complement(a: impl Into<Operand>) -> AluOperation {
    AluOperation {
        op: AluOp::Complement,
        operands: vec![a.into()],
    }
}

/// `add(a, b)` — the two-operand ALU addition.
pub fn add(a: impl Into<Operand>, b: impl Into<Operand>) -> AluOperation {
    AluOperation {
        op: AluOp::Add,
        operands: vec![a.into(), b.into()],
    }
}

/// `subtract(a, b)` — the two-operand ALU subtraction.
pub fn subtract(a: impl Into<Operand>, b: impl Into<Operand>) -> AluOperation {
    AluOperation {
        op: AluOp::Subtract,
        operands: vec![a.into(), b.into()],
    }
}

/// The source half of an RTL move: an integer constant, a register, or an
/// ALU operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An integer constant, checked against 0..=255 during [`Computer::validate`].
    Const(i64),
    Reg(Register),
    Alu(AluOperation),
}

impl From<Register> for Source {
    fn from(value: Register) -> Self {
        Source::Reg(value)
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Source::Reg(Register::from(value))
    }
}

impl From<u8> for Source {
    fn from(value: u8) -> Self {
        Source::Const(value as i64)
    }
}

impl From<i32> for Source {
    fn from(value: i32) -> Self {
        Source::Const(value as i64)
    }
}

impl From<AluOperation> for Source {
    fn from(value: AluOperation) -> Self {
        Source::Alu(value)
    }
}

/// `target <- source`, one RTL move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub target: Register,
    pub source: Source,
}

impl Move {
    pub(crate) fn validate(&self) -> Result<()> {
        check_register(&self.target)?;
        match &self.source {
            Source::Const(v) => {
                check_constant(*v)?;
            }
            Source::Reg(reg) => check_register(reg)?,
            Source::Alu(alu) => {
                for operand in &alu.operands {
                    match operand {
                        Operand::Reg(reg) => check_register(reg)?,
                        Operand::Const(v) => {
                            check_constant(*v)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// A user instruction: a name and its ordered list of RTL moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub name: String,
    pub moves: Vec<Move>,
}

impl Instruction {
    pub fn new(name: impl Into<String>) -> Self {
        Instruction {
            name: name.into(),
            moves: Vec::new(),
        }
    }

    /// Append one RTL move. `target` is a register identifier (`"A"`,
    /// `"pc"`, ...); `source` is an integer constant, a register
    /// identifier, or an [`AluOperation`] built with [`add`], [`subtract`]
    /// or [`complement`].
    pub fn move_(mut self, target: impl Into<Register>, source: impl Into<Source>) -> Self {
        self.moves.push(Move {
            target: target.into(),
            source: source.into(),
        });
        self
    }
}

/// The top-level computer: its name, RAM address width, and ordered
/// instruction list. Immutable once [`crate::generate`] begins.
#[derive(Debug, Clone)]
pub struct Computer {
    pub name: String,
    pub address_width: u32,
    pub instructions: Vec<Instruction>,
}

impl Computer {
    pub fn new(name: impl Into<String>) -> Self {
        Computer {
            name: name.into(),
            address_width: 5,
            instructions: Vec::new(),
        }
    }

    pub fn address_width(mut self, width: u32) -> Self {
        self.address_width = width;
        self
    }

    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Validate the accumulated data before the pipeline runs: every move
    /// uses a well-formed register, every constant is in range, instruction
    /// names are unique and there is at least one instruction.
    pub fn validate(&self) -> Result<()> {
        if self.instructions.is_empty() {
            return Err(GenError::NoInstructions);
        }
        let mut seen = std::collections::HashSet::new();
        for instr in &self.instructions {
            if !seen.insert(&instr.name) {
                return Err(GenError::DuplicateInstruction(instr.name.clone()));
            }
            for mv in &instr.moves {
                mv.validate()?;
            }
        }
        Ok(())
    }
}
