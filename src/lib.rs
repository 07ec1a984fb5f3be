//! AST-based mutant generation
//!
//! This library generates program mutants from source files: it parses each
//! compilation unit into a typed tree, runs a catalog of mutation operators
//! over it, and writes one directory per surviving mutant. Candidates that a
//! suppression rule proves equivalent to the original program, or duplicates
//! of another enabled operator's mutant, are recorded in an audit log instead
//! of being emitted.
//!
//! # Example Configuration
//!
//! ```yaml
//! version: "1.0"
//! mutant_root: mutants
//! operators: [ROR, AOIS, SDL]
//! sources:
//!   - fixtures/Counter.java
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use mutantgen::{generate_session, parse_unit, Config, OpId, RunContext};
//! use std::path::Path;
//!
//! let source = std::fs::read_to_string("Counter.java").unwrap();
//! let unit = parse_unit(&source, "Counter.java").unwrap();
//! let ctx = RunContext::new([OpId::Ror, OpId::Sdl]);
//! let summaries = generate_session(&[unit], &[OpId::Ror, OpId::Sdl], &ctx, Path::new("mutants"));
//! ctx.write_audit(Path::new("mutants")).unwrap();
//! # let _ = (summaries, Config::load);
//! ```

pub mod ast;
pub mod config;
pub mod context;
pub mod driver;
pub mod drule;
pub mod emit;
pub mod error;
pub mod lexer;
pub mod mutator;
pub mod operators;
pub mod parse;
pub mod printer;
pub mod report;

// Re-export main types at crate root
pub use ast::{CompilationUnit, Fragment, NodeId, NodeKind};
pub use config::Config;
pub use driver::{compile_mutants, generate_session, generate_unit, UnitSummary};
pub use drule::{RuleId, RunContext};
pub use emit::{FsSink, MemorySink, MutantSink};
pub use error::{MutationError, Result};
pub use mutator::{Mutant, MutantId, Mutator, OpId, SuppressionKind, SuppressionRecord};
pub use parse::parse_unit;
pub use report::GenerationReport;
