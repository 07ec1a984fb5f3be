//! Report generation for generation runs
//!
//! This module formats and displays the outcome of a generation session.

use colored::Colorize;
use std::time::Duration;

use crate::driver::{CompileOutcome, UnitSummary};

/// Summary report of one generation session
#[derive(Debug)]
pub struct GenerationReport {
    pub units: Vec<UnitSummary>,
    pub compile_outcomes: Vec<CompileOutcome>,
    pub total_duration: Duration,
}

impl GenerationReport {
    /// Create a new report from per-unit summaries
    pub fn new(
        units: Vec<UnitSummary>,
        compile_outcomes: Vec<CompileOutcome>,
        total_duration: Duration,
    ) -> Self {
        Self {
            units,
            compile_outcomes,
            total_duration,
        }
    }

    /// Total number of emitted mutants
    pub fn emitted(&self) -> usize {
        self.units.iter().map(|u| u.total_emitted()).sum()
    }

    /// Total number of candidates proven equivalent
    pub fn equivalent(&self) -> usize {
        self.units.iter().map(|u| u.total_equivalent()).sum()
    }

    /// Total number of candidates proven duplicates
    pub fn duplicated(&self) -> usize {
        self.units.iter().map(|u| u.total_duplicated()).sum()
    }

    /// Emitted mutants that failed the external compile step
    pub fn compile_failures(&self) -> Vec<&CompileOutcome> {
        self.compile_outcomes.iter().filter(|o| !o.success).collect()
    }

    /// Emission failures across all units
    pub fn failures(&self) -> usize {
        self.units.iter().map(|u| u.failures.len()).sum()
    }

    /// Share of proposed candidates that was suppressed before emission
    pub fn reduction(&self) -> f64 {
        let proposed = self.emitted() + self.equivalent() + self.duplicated();
        if proposed == 0 {
            return 0.0;
        }
        ((self.equivalent() + self.duplicated()) as f64 / proposed as f64) * 100.0
    }

    /// Print the report to stdout
    pub fn print(&self) {
        println!();
        println!("{}", "Mutant Generation Report".bold());
        println!("{}", "=".repeat(60));
        println!();

        for unit in &self.units {
            println!("{}", unit.file.bold());
            for op in &unit.operators {
                let emitted = format!("{:>4}", op.emitted);
                let emitted = if op.emitted > 0 {
                    emitted.green()
                } else {
                    emitted.dimmed()
                };
                let mut line = format!("  {:<6} {} emitted", op.op.name(), emitted);
                if op.equivalent > 0 {
                    line.push_str(&format!(", {} equivalent", op.equivalent));
                }
                if op.duplicated > 0 {
                    line.push_str(&format!(", {} duplicated", op.duplicated));
                }
                println!("{}", line);
            }
            for failure in &unit.failures {
                println!("  {} {}", "[FAILED]".red().bold(), failure);
            }
        }

        println!();
        println!("{}", "Summary".bold());
        println!("{}", "-".repeat(40));
        println!("Emitted:           {}", self.emitted());
        println!(
            "Equivalent:        {} {}",
            self.equivalent(),
            "(proven equal to the original)".dimmed()
        );
        println!(
            "Duplicated:        {} {}",
            self.duplicated(),
            "(proven equal to another mutant)".dimmed()
        );
        if self.failures() > 0 {
            println!("Write failures:    {}", self.failures());
        }

        println!();
        let reduction = self.reduction();
        let reduction_str = format!("{:.1}%", reduction);
        let reduction_colored = if reduction > 0.0 {
            reduction_str.green().bold()
        } else {
            reduction_str.dimmed().bold()
        };
        println!("Reduction:         {}", reduction_colored);
        println!(
            "Duration:          {:.2}s",
            self.total_duration.as_secs_f64()
        );

        let compile_failures = self.compile_failures();
        if !self.compile_outcomes.is_empty() {
            println!();
            println!(
                "Compiled:          {}/{}",
                self.compile_outcomes.len() - compile_failures.len(),
                self.compile_outcomes.len()
            );
        }
        if !compile_failures.is_empty() {
            println!();
            println!("{}", "Stillborn Mutants (did not compile)".yellow().bold());
            println!("{}", "-".repeat(40));
            for outcome in compile_failures {
                println!("  {}", outcome.mutant.label().yellow());
            }
        }
    }
}
