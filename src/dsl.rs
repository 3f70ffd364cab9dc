//! The DSL facade (§6, §9): `computer(name)` and `instruction(name)` are
//! just constructors for [`crate::rtl::Computer`] and
//! [`crate::rtl::Instruction`] — per §9's design note, "the DSL facade is
//! sugar, not essential". The actual accumulation happens through those
//! types' own chained builder methods (`.address_width(..)`, `.move_(..)`).

use crate::rtl::{Computer, Instruction};

/// `computer(name) { ... }` — start declaring a computer.
pub fn computer(name: impl Into<String>) -> Computer {
    Computer::new(name)
}

/// `instruction(name) { ... }` — start declaring one instruction.
pub fn instruction(name: impl Into<String>) -> Instruction {
    Instruction::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtl::add;

    #[test]
    fn builder_chain_reads_like_the_dsl_surface() {
        let c = computer("demo")
            .address_width(6)
            .instruction(instruction("load_seven").move_("A", 7u8))
            .instruction(instruction("add_ab").move_("A", add("A", "B")));
        assert_eq!(c.name, "demo");
        assert_eq!(c.address_width, 6);
        assert_eq!(c.instructions.len(), 2);
    }
}
