//! Error types for the RTL-to-VHDL compiler.

use std::fmt;

/// Everything that can go wrong while compiling a [`crate::rtl::Computer`]
/// into VHDL.
///
/// DSL errors are raised while the builder is still being assembled, before
/// any file is touched. I/O errors can only occur during emission, at which
/// point partial output may already be on disk.
#[derive(Debug)]
pub enum GenError {
    /// A move referenced a register identifier that is not part of the
    /// fixed DSL vocabulary and was never declared.
    UnknownRegister(String),
    /// An integer constant fell outside the representable 0..=255 range.
    ConstantOutOfRange(i64),
    /// A computer was asked to `generate` with no instructions declared,
    /// leaving the opcode width undefined.
    NoInstructions,
    /// Two instructions were declared with the same name.
    DuplicateInstruction(String),
    /// A non-terminal microcode state left the assembler without a `next`
    /// link. This can only happen from a bug in [`crate::assemble`] itself;
    /// the assembler asserts rather than constructs this in practice (§7),
    /// but the variant exists so the error type stays uniform and testable.
    MissingNext(String),
    /// Writing the generated VHDL to disk failed.
    Io(std::io::Error),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::UnknownRegister(name) => write!(f, "unknown register `{name}`"),
            GenError::ConstantOutOfRange(v) => {
                write!(f, "constant {v} is out of range 0..=255")
            }
            GenError::NoInstructions => {
                write!(f, "computer has no instructions; opcode width is undefined")
            }
            GenError::DuplicateInstruction(name) => {
                write!(f, "instruction `{name}` declared more than once")
            }
            GenError::MissingNext(state) => {
                write!(f, "internal error: state `{state}` has no successor")
            }
            GenError::Io(err) => write!(f, "failed to write VHDL output: {err}"),
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GenError {
    fn from(value: std::io::Error) -> Self {
        GenError::Io(value)
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_displays_without_panicking() {
        let variants = [
            GenError::UnknownRegister("zz".to_string()),
            GenError::ConstantOutOfRange(300),
            GenError::NoInstructions,
            GenError::DuplicateInstruction("nop".to_string()),
            GenError::MissingNext("add_0".to_string()),
            GenError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")),
        ];
        for variant in variants {
            assert!(!variant.to_string().is_empty());
        }
    }
}
