//! Structural invariants that every generated mutant must satisfy,
//! checked across the whole operator catalog on one richer source file.

use std::collections::HashSet;

use mutantgen::ast::structural_diff;
use mutantgen::printer::render_unit;
use mutantgen::{generate_unit, parse_unit, MemorySink, OpId, RunContext};

const SOURCE: &str = "\
class Stack {
    int[] items;
    int top;
    Stack(int capacity) {
        this.top = 0;
    }
    void push(int value) {
        items[top] = value;
        top += 1;
    }
    int pop() {
        if (top > 0) {
            top -= 1;
            return items[top];
        }
        return -1;
    }
    boolean empty() {
        return top == 0 && items.length > 0;
    }
}";

#[test]
fn every_mutant_differs_from_the_original_in_exactly_one_node() {
    let unit = parse_unit(SOURCE, "Stack.java").unwrap();
    let ctx = RunContext::new(OpId::ALL);
    let mut sink = MemorySink::default();
    generate_unit(&unit, &OpId::ALL, &ctx, &mut sink);

    assert!(!sink.mutants.is_empty());
    for mutant in &sink.mutants {
        assert_eq!(
            structural_diff(&unit, &mutant.unit),
            1,
            "{} changed more than one node",
            mutant.id.label()
        );
    }
}

#[test]
fn rendered_mutants_are_distinct_within_each_operator() {
    let unit = parse_unit(SOURCE, "Stack.java").unwrap();
    let ctx = RunContext::new(OpId::ALL);
    let mut sink = MemorySink::default();
    generate_unit(&unit, &OpId::ALL, &ctx, &mut sink);

    for op in OpId::ALL {
        let rendered: Vec<String> = sink
            .mutants
            .iter()
            .filter(|m| m.id.op == op)
            .map(|m| render_unit(&m.unit))
            .collect();
        let unique: HashSet<&String> = rendered.iter().collect();
        assert_eq!(
            rendered.len(),
            unique.len(),
            "{} emitted duplicate renderings",
            op
        );
    }
}

#[test]
fn every_mutant_parses_back() {
    let unit = parse_unit(SOURCE, "Stack.java").unwrap();
    let ctx = RunContext::new(OpId::ALL);
    let mut sink = MemorySink::default();
    generate_unit(&unit, &OpId::ALL, &ctx, &mut sink);

    for mutant in &sink.mutants {
        let text = render_unit(&mutant.unit);
        parse_unit(&text, "Stack.java")
            .unwrap_or_else(|e| panic!("{} does not reparse: {e}", mutant.id.label()));
    }
}

#[test]
fn directory_numbers_never_collide_across_a_run() {
    let unit = parse_unit(SOURCE, "Stack.java").unwrap();
    let ctx = RunContext::new(OpId::ALL);
    let mut sink = MemorySink::default();
    generate_unit(&unit, &OpId::ALL, &ctx, &mut sink);

    // suppressed candidates reserve a directory number too, so no emitted
    // directory is ever reused by an audit line and no two audit lines of
    // one scope name the same directory
    let mut seen: HashSet<String> = HashSet::new();
    for mutant in &sink.mutants {
        let label = mutant.id.label();
        assert!(seen.insert(label.clone()), "{label} assigned twice");
    }
    for record in ctx.records() {
        assert!(
            seen.insert(record.mutant_dir.clone()),
            "{} assigned twice",
            record.mutant_dir
        );
    }

    // within one scope an operator's numbers grow in emission order
    let mut last: std::collections::HashMap<(OpId, String), u32> =
        std::collections::HashMap::new();
    for mutant in &sink.mutants {
        let key = (mutant.id.op, mutant.id.scope.clone());
        let prev = last.insert(key, mutant.id.seq).unwrap_or(0);
        assert!(mutant.id.seq > prev, "{} out of order", mutant.id.label());
    }
}
