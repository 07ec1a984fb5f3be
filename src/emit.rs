//! Mutant sinks
//!
//! An approved mutant goes to a [`MutantSink`]. The filesystem sink writes
//! one directory per mutant holding the full mutated source file; the memory
//! sink backs tests and dry runs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MutationError, Result};
use crate::mutator::Mutant;
use crate::printer::render_unit;

pub trait MutantSink {
    fn write(&mut self, mutant: &Mutant) -> Result<()>;
}

/// Writes each mutant under `<root>/<scope>/<OP>_<seq>/<file_name>`.
#[derive(Debug)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsSink { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MutantSink for FsSink {
    fn write(&mut self, mutant: &Mutant) -> Result<()> {
        let dir = self.root.join(mutant.id.dir());
        fs::create_dir_all(&dir).map_err(|e| MutationError::Emission {
            path: dir.clone(),
            error: e,
        })?;
        let path = dir.join(&mutant.unit.file_name);
        fs::write(&path, render_unit(&mutant.unit)).map_err(|e| MutationError::Emission {
            path: path.clone(),
            error: e,
        })?;
        debug!(mutant = %mutant.id.label(), "wrote mutant");
        Ok(())
    }
}

/// Collects mutants in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub mutants: Vec<Mutant>,
}

impl MutantSink for MemorySink {
    fn write(&mut self, mutant: &Mutant) -> Result<()> {
        self.mutants.push(mutant.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Fragment, Literal, NodeKind};
    use crate::mutator::{MutantId, OpId};
    use crate::parse::parse_unit;

    #[test]
    fn fs_sink_lays_out_one_directory_per_mutant() {
        let src = "class A { int f(int x) { if (x > 1) { return 1; } return 0; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let cond = unit
            .descendants(unit.root())
            .into_iter()
            .find(|id| matches!(unit.kind(*id), NodeKind::Binary { .. }))
            .unwrap();
        let (mutated, _) = unit.apply(cond, &Fragment::Literal(Literal::Bool(true)));

        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path());
        sink.write(&Mutant {
            id: MutantId {
                op: OpId::Ror,
                scope: "int_f(int)".into(),
                seq: 1,
            },
            unit: mutated,
            description: "x > 1 => true".into(),
        })
        .unwrap();

        let written = dir.path().join("int_f(int)/ROR_1/A.java");
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.contains("if (true)"), "unexpected output: {}", text);
    }
}
