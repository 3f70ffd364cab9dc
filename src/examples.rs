//! Built-in example [`Computer`]s (§8, ambient property 8). The CLI's
//! `--example` flag and the integration tests in `tests/` both drive the
//! full `generate` pipeline through these rather than hand-rolling a DSL
//! program inline every time.

use crate::dsl::{computer, instruction};
use crate::rtl::{add, Computer};

/// A single instruction with no moves; exercises the S1 synthesized-no-op
/// policy (§4.2).
pub fn nop() -> Computer {
    computer("nop").instruction(instruction("nop"))
}

/// One constant-load instruction (S2).
pub fn load_seven() -> Computer {
    computer("load_seven").instruction(instruction("load_seven").move_("A", 7u8))
}

/// One register-to-register move (S3).
pub fn mov_a_pc() -> Computer {
    computer("mov_a_pc").instruction(instruction("mov_a_pc").move_("A", "pc"))
}

/// One binary ALU instruction (S4).
pub fn add_ab() -> Computer {
    computer("add_ab").instruction(instruction("add_ab").move_("A", add("A", "B")))
}

/// Two instructions, enough to exercise opcode assignment and the decode
/// guard fan-out (S5, S6).
pub fn two_instruction_decode() -> Computer {
    computer("two_instruction_decode")
        .instruction(instruction("inst_a").move_("A", 1u8))
        .instruction(instruction("inst_b").move_("A", 2u8))
}

/// Names accepted by the CLI's `--example` flag, in the order they're
/// listed in `--help`.
pub const NAMES: [&str; 5] = ["nop", "load_seven", "mov_a_pc", "add_ab", "two_instruction_decode"];

/// Look up a built-in example by name.
pub fn by_name(name: &str) -> Option<Computer> {
    match name {
        "nop" => Some(nop()),
        "load_seven" => Some(load_seven()),
        "mov_a_pc" => Some(mov_a_pc()),
        "add_ab" => Some(add_ab()),
        "two_instruction_decode" => Some(two_instruction_decode()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_resolves() {
        for name in NAMES {
            assert!(by_name(name).is_some(), "missing example `{name}`");
        }
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert!(by_name("does_not_exist").is_none());
    }

    #[test]
    fn every_example_validates() {
        for name in NAMES {
            let computer = by_name(name).unwrap();
            assert!(computer.validate().is_ok(), "`{name}` failed to validate");
        }
    }
}
