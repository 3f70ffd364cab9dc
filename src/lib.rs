//! Compiler from an RTL instruction-set DSL to synthesizable VHDL control
//! units (§1). [`generate`] drives the whole pipeline: RTL → microcode
//! (`microcode`) → control-FSM and structural-top IR (`assemble`, `fsm`) →
//! VHDL text (`vhdl`).

mod assemble;
mod components;
mod dsl;
mod error;
mod examples;
mod fsm;
mod microcode;
mod rtl;
mod vhdl;

pub use dsl::{computer, instruction};
pub use error::{GenError, Result};
pub use examples::{by_name as example, NAMES as EXAMPLE_NAMES};
pub use rtl::{add, complement, subtract, Computer, Instruction};

use std::path::{Path, PathBuf};

/// The files one `generate` call wrote.
#[derive(Debug)]
pub struct GeneratedFiles {
    pub control_vhdl: PathBuf,
    pub main_vhdl: PathBuf,
    pub components: Vec<PathBuf>,
}

/// Compile `computer` and write `control.vhdl` and `main.vhdl` under
/// `out_dir/<computer.name>/` (§6). When `with_components` is set, also
/// vendor the static datapath library (§4.7) under a `components/`
/// subdirectory so the pair is drop-in synthesizable on its own.
///
/// Validates the computer first (§7): a DSL error is returned before any
/// file is touched. Once emission starts, an I/O failure may leave partial
/// output on disk (§7) — the caller should treat it as invalid.
#[tracing::instrument(skip(computer), fields(name = %computer.name))]
pub fn generate(computer: &Computer, out_dir: &Path, with_components: bool) -> Result<GeneratedFiles> {
    computer.validate()?;
    tracing::debug!(instructions = computer.instructions.len(), "validated computer");

    let assembled = assemble::assemble(computer);
    tracing::debug!(
        states = assembled.control.states.len(),
        "assembled control FSM and structural top"
    );

    let dir = out_dir.join(&computer.name);
    std::fs::create_dir_all(&dir)?;

    let control_vhdl = dir.join("control.vhdl");
    std::fs::write(&control_vhdl, assembled.control.to_vhdl().to_string())?;
    tracing::info!(path = %control_vhdl.display(), "wrote control unit");

    let main_vhdl = dir.join("main.vhdl");
    std::fs::write(&main_vhdl, assembled.top.to_string())?;
    tracing::info!(path = %main_vhdl.display(), "wrote structural top");

    let mut components = Vec::new();
    if with_components {
        let components_dir = dir.join("components");
        std::fs::create_dir_all(&components_dir)?;
        for (name, text) in components::ALL {
            let path = components_dir.join(format!("{name}.vhdl"));
            std::fs::write(&path, text)?;
            tracing::info!(path = %path.display(), "wrote datapath component");
            components.push(path);
        }
    }

    Ok(GeneratedFiles {
        control_vhdl,
        main_vhdl,
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_writes_both_files_for_every_example() {
        for name in EXAMPLE_NAMES {
            let computer = example(name).unwrap();
            let dir = tempfile::tempdir().unwrap();
            let files = generate(&computer, dir.path(), false).unwrap();
            assert!(files.control_vhdl.exists());
            assert!(files.main_vhdl.exists());
            assert!(!std::fs::read_to_string(&files.control_vhdl).unwrap().is_empty());
            assert!(!std::fs::read_to_string(&files.main_vhdl).unwrap().is_empty());
            assert!(files.components.is_empty());
        }
    }

    #[test]
    fn generate_with_components_vendors_the_datapath_library() {
        let computer = example("load_seven").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let files = generate(&computer, dir.path(), true).unwrap();
        assert_eq!(files.components.len(), 4);
        for path in &files.components {
            assert!(path.exists());
        }
    }

    #[test]
    fn generate_rejects_an_empty_computer_before_touching_disk() {
        let computer = Computer::new("empty");
        let dir = tempfile::tempdir().unwrap();
        let err = generate(&computer, dir.path(), false).unwrap_err();
        assert!(matches!(err, GenError::NoInstructions));
        assert!(!dir.path().join("empty").exists());
    }
}
