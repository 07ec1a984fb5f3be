//! Generation driver
//!
//! Runs the selected operators over each parsed unit: one traditional pass
//! over method bodies, one class-level pass for the operators that mutate
//! declarations. Units are independent, so a session fans one worker thread
//! out per unit, all sharing the one [`RunContext`].

use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use tracing::{info, warn};

use crate::ast::CompilationUnit;
use crate::drule::RunContext;
use crate::emit::{FsSink, MutantSink};
use crate::error::{MutationError, Result};
use crate::mutator::{run_mutator, MutantId, OpId, SuppressionKind};
use crate::operators;

/// Emission counts of one operator over one unit.
#[derive(Debug, Clone)]
pub struct OperatorSummary {
    pub op: OpId,
    pub emitted: usize,
    pub equivalent: usize,
    pub duplicated: usize,
}

/// Outcome of one unit's generation.
#[derive(Debug)]
pub struct UnitSummary {
    pub file: String,
    pub operators: Vec<OperatorSummary>,
    pub emitted: Vec<MutantId>,
    pub failures: Vec<MutationError>,
}

impl UnitSummary {
    pub fn total_emitted(&self) -> usize {
        self.operators.iter().map(|o| o.emitted).sum()
    }

    pub fn total_equivalent(&self) -> usize {
        self.operators.iter().map(|o| o.equivalent).sum()
    }

    pub fn total_duplicated(&self) -> usize {
        self.operators.iter().map(|o| o.duplicated).sum()
    }
}

/// Run `ops` over one unit, writing approved mutants into `sink`.
pub fn generate_unit(
    unit: &CompilationUnit,
    ops: &[OpId],
    ctx: &RunContext,
    sink: &mut dyn MutantSink,
) -> UnitSummary {
    let mut summary = UnitSummary {
        file: unit.file_name.clone(),
        operators: Vec::new(),
        emitted: Vec::new(),
        failures: Vec::new(),
    };
    // traditional operators first, then the class-level pass
    let passes = [false, true];
    for class_level in passes {
        for &op in ops.iter().filter(|op| op.is_class_level() == class_level) {
            let mut mutator = operators::build(op);
            let outcome = run_mutator(mutator.as_mut(), unit, op, ctx, Some(&mut *sink));
            let equivalent = outcome
                .suppressed
                .iter()
                .filter(|r| r.kind == SuppressionKind::Equivalent)
                .count();
            let duplicated = outcome.suppressed.len() - equivalent;
            summary.operators.push(OperatorSummary {
                op,
                emitted: outcome.emitted.len(),
                equivalent,
                duplicated,
            });
            summary.emitted.extend(outcome.emitted);
            summary.failures.extend(outcome.failures);
        }
    }
    info!(
        file = %summary.file,
        emitted = summary.total_emitted(),
        equivalent = summary.total_equivalent(),
        duplicated = summary.total_duplicated(),
        "unit done"
    );
    summary
}

fn unit_root(root: &Path, unit: &CompilationUnit) -> PathBuf {
    let stem = Path::new(&unit.file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| unit.file_name.clone());
    root.join(stem)
}

/// Run a whole session: one worker per unit, each with its own filesystem
/// sink rooted at `<root>/<unit stem>/`.
pub fn generate_session(
    units: &[CompilationUnit],
    ops: &[OpId],
    ctx: &RunContext,
    root: &Path,
) -> Vec<UnitSummary> {
    thread::scope(|scope| {
        let handles: Vec<_> = units
            .iter()
            .map(|unit| {
                scope.spawn(move || {
                    let mut sink = FsSink::new(unit_root(root, unit));
                    generate_unit(unit, ops, ctx, &mut sink)
                })
            })
            .collect();
        handles
            .into_iter()
            .zip(units)
            .map(|(handle, unit)| match handle.join() {
                Ok(summary) => summary,
                Err(_) => {
                    warn!(file = %unit.file_name, "generation worker panicked");
                    UnitSummary {
                        file: unit.file_name.clone(),
                        operators: Vec::new(),
                        emitted: Vec::new(),
                        failures: vec![MutationError::Config {
                            message: format!("generation failed for {}", unit.file_name),
                        }],
                    }
                }
            })
            .collect()
    })
}

/// Outcome of compiling one emitted mutant.
#[derive(Debug)]
pub struct CompileOutcome {
    pub mutant: MutantId,
    pub success: bool,
    pub stderr: String,
}

/// Feed each emitted mutant source through an external compiler command. A
/// mutant that fails to compile is reported, never fatal: some deletions
/// legitimately produce uncompilable programs and the compiler is the
/// cheapest way to find them.
pub fn compile_mutants(
    command: &str,
    root: &Path,
    emitted: &[MutantId],
    file_name: &str,
) -> Result<Vec<CompileOutcome>> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| MutationError::Config {
        message: "empty compile command".to_string(),
    })?;
    let args: Vec<&str> = parts.collect();

    let mut outcomes = Vec::new();
    for id in emitted {
        let source = root.join(id.dir()).join(file_name);
        let output = Command::new(program).args(&args).arg(&source).output();
        let outcome = match output {
            Ok(output) => CompileOutcome {
                mutant: id.clone(),
                success: output.status.success(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => CompileOutcome {
                mutant: id.clone(),
                success: false,
                stderr: e.to_string(),
            },
        };
        if !outcome.success {
            warn!(mutant = %id.label(), "mutant failed to compile");
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::MemorySink;
    use crate::parse::parse_unit;

    #[test]
    fn class_level_operators_run_after_traditional_ones() {
        let src = "class A { int n; int f(int x) { this.n = x; return x; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ops = [OpId::Jtd, OpId::Sdl];
        let ctx = RunContext::new(ops);
        let mut sink = MemorySink::default();
        let summary = generate_unit(&unit, &ops, &ctx, &mut sink);

        let order: Vec<OpId> = summary.operators.iter().map(|o| o.op).collect();
        assert_eq!(order, vec![OpId::Sdl, OpId::Jtd]);
        let jtd = summary.operators.iter().find(|o| o.op == OpId::Jtd).unwrap();
        assert_eq!(jtd.emitted, 1);
    }

    #[test]
    fn session_writes_under_per_unit_roots() {
        let a = parse_unit(
            "class A { int f(int x) { return x + 1; } }",
            "A.java",
        )
        .unwrap();
        let b = parse_unit(
            "class B { int g(int y) { return y - 1; } }",
            "B.java",
        )
        .unwrap();
        let ops = [OpId::Aorb];
        let ctx = RunContext::new(ops);
        let dir = tempfile::tempdir().unwrap();
        let summaries = generate_session(&[a, b], &ops, &ctx, dir.path());

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].total_emitted(), 4);
        assert!(dir.path().join("A/int_f(int)/AORB_1/A.java").exists());
        assert!(dir.path().join("B/int_g(int)/AORB_1/B.java").exists());
    }

    #[test]
    fn suppression_counts_split_by_kind() {
        let src = "class A { int f(int x) { if (x > 10) { return 1; } return 0; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ops = [OpId::Ror, OpId::Sdl];
        let ctx = RunContext::new(ops);
        let mut sink = MemorySink::default();
        let summary = generate_unit(&unit, &ops, &ctx, &mut sink);

        let ror = summary.operators.iter().find(|o| o.op == OpId::Ror).unwrap();
        assert_eq!(ror.emitted, 5);
        assert_eq!(ror.duplicated, 2);
        assert_eq!(ror.equivalent, 0);
    }
}
