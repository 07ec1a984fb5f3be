//! End-to-end generation scenarios over small source files.

use std::collections::HashSet;

use mutantgen::driver::generate_unit;
use mutantgen::{
    generate_session, parse_unit, MemorySink, OpId, RunContext, SuppressionKind,
};

fn descriptions(sink: &MemorySink) -> Vec<&str> {
    sink.mutants.iter().map(|m| m.description.as_str()).collect()
}

#[test]
fn relational_replacement_alone_emits_the_full_fan() {
    let src = "class A { int f(int x) { if (x > 10) { return 1; } return 0; } }";
    let unit = parse_unit(src, "A.java").unwrap();
    let ops = [OpId::Ror];
    let ctx = RunContext::new(ops);
    let mut sink = MemorySink::default();
    let summary = generate_unit(&unit, &ops, &ctx, &mut sink);

    assert_eq!(summary.total_emitted(), 7);
    assert_eq!(summary.total_equivalent(), 0);
    assert_eq!(summary.total_duplicated(), 0);
    assert!(descriptions(&sink).contains(&"x > 10 => true"));
    assert!(descriptions(&sink).contains(&"x > 10 => false"));
}

#[test]
fn enabling_statement_deletion_absorbs_the_forced_guards() {
    let src = "class A { int f(int x) { if (x > 10) { return 1; } return 0; } }";
    let unit = parse_unit(src, "A.java").unwrap();
    let ops = [OpId::Ror, OpId::Sdl];
    let ctx = RunContext::new(ops);
    let mut sink = MemorySink::default();
    let summary = generate_unit(&unit, &ops, &ctx, &mut sink);

    let ror = summary
        .operators
        .iter()
        .find(|o| o.op == OpId::Ror)
        .unwrap();
    assert_eq!(ror.emitted, 5);
    assert_eq!(ror.duplicated, 2);

    let duplicates: Vec<_> = ctx
        .records()
        .into_iter()
        .filter(|r| r.kind == SuppressionKind::Duplicated)
        .collect();
    assert_eq!(duplicates.len(), 2);
    for record in &duplicates {
        assert_eq!(record.op, OpId::Ror);
        assert_eq!(record.competing, Some(OpId::Sdl));
        assert!(record.audit_line().starts_with("ROR:SDL:int_f(int)/ROR_"));
    }
}

#[test]
fn increment_insertion_skips_dying_local_reads() {
    let src = "class A { int f(int a, int b) { int v = a; return v; } }";
    let unit = parse_unit(src, "A.java").unwrap();
    let ops = [OpId::Aois];
    let ctx = RunContext::new(ops);
    let mut sink = MemorySink::default();
    let summary = generate_unit(&unit, &ops, &ctx, &mut sink);

    assert_eq!(descriptions(&sink), vec!["a => a++", "a => a--"]);
    assert_eq!(summary.total_equivalent(), 2);
}

#[test]
fn this_deletion_respects_shadowing() {
    let src = "\
class Box {
    int size;
    Box(int size) { this.size = size; }
    void grow(int by) { this.size = this.size + by; }
}";
    let unit = parse_unit(src, "Box.java").unwrap();
    let ops = [OpId::Jtd];
    let ctx = RunContext::new(ops);
    let mut sink = MemorySink::default();
    generate_unit(&unit, &ops, &ctx, &mut sink);

    // the constructor's accesses are shadowed by its parameter; only the
    // two accesses in grow qualify
    let labels: Vec<String> = sink.mutants.iter().map(|m| m.id.label()).collect();
    assert_eq!(labels, vec!["Box/JTD_1", "Box/JTD_2"]);
    for m in &sink.mutants {
        assert_eq!(m.description, "this.size => size");
    }
}

#[test]
fn session_lays_out_mutants_and_audit_files() {
    let src = "\
class Counter {
    int n;
    int bump(int by) {
        if (by > 0) { this.n = this.n + by; }
        return n;
    }
}";
    let unit = parse_unit(src, "Counter.java").unwrap();
    let ops = [OpId::Ror, OpId::Sdl, OpId::Jtd];
    let ctx = RunContext::new(ops);
    let root = tempfile::tempdir().unwrap();
    let summaries = generate_session(&[unit], &ops, &ctx, root.path());
    ctx.write_audit(root.path()).unwrap();

    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].failures.is_empty());

    // a relational mutant, a deletion mutant, and a class-level mutant
    let base = root.path().join("Counter");
    assert!(base.join("int_bump(int)/ROR_1/Counter.java").exists());
    assert!(base.join("int_bump(int)/SDL_1/Counter.java").exists());
    assert!(base.join("Counter/JTD_1/Counter.java").exists());

    // forcing the guard duplicates the deletions, so the audit file exists
    let audit = std::fs::read_to_string(root.path().join("duplicated_mutants")).unwrap();
    assert!(audit.lines().all(|l| l.starts_with("ROR:SDL:")));
    assert_eq!(audit.lines().count(), 2);

    // every mutant file parses back and differs from the original
    let original = std::fs::read_to_string(base.join("int_bump(int)/ROR_1/Counter.java")).unwrap();
    parse_unit(&original, "Counter.java").unwrap();
}

#[test]
fn rerunning_a_session_is_deterministic() {
    let src = "class A { int f(int x) { if (x > 10) { return 1; } return 0; } }";
    let unit = parse_unit(src, "A.java").unwrap();
    let ops = [OpId::Ror, OpId::Sdl, OpId::Aois];

    let mut seen = Vec::new();
    for _ in 0..2 {
        let ctx = RunContext::new(ops);
        let mut sink = MemorySink::default();
        generate_unit(&unit, &ops, &ctx, &mut sink);
        let labels: HashSet<String> = sink.mutants.iter().map(|m| m.id.label()).collect();
        seen.push(labels);
    }
    assert_eq!(seen[0], seen[1]);
}
