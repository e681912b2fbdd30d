//! Property-based tests for the linear loop optimizer
//!
//! These tests use proptest to generate programs and verify that:
//! 1. Optimization never changes program length or breaks jump pairing
//! 2. Raw and optimized programs produce identical output and tapes
//! 3. Generated linear loops are always rewritten
//! 4. Loops that clear cells, including their own counter, stay equivalent

use proptest::prelude::*;
use tapevm::vm::validate;
use tapevm::{assemble, optimize, Error, Executor, VmConfig};

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

fn test_config() -> VmConfig {
    VmConfig {
        tape_size: 64,
        start_pointer: 32,
        max_steps: Some(20_000),
        ..VmConfig::default()
    }
}

/// Balanced programs built from runs, I/O and nested loops
fn bracketed_program() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[+]{1,5}",
        "[-]{1,3}",
        "[<>]{1,2}",
        Just(".".to_string()),
        Just(",".to_string()),
        Just("[-]".to_string()),
        Just("[+]".to_string()),
    ];

    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..6).prop_map(|parts| parts.concat()),
            prop::collection::vec(inner, 0..6).prop_map(|parts| format!("[{}]", parts.concat())),
        ]
    })
}

/// A counter set up with `+`, then a loop moving `delta` to nearby cells
fn linear_loop_program() -> impl Strategy<Value = String> {
    (
        1usize..20,
        prop::collection::vec((-3i32..=3, -3i32..=3), 1..5),
        any::<bool>(),
    )
        .prop_map(|(counter, moves, decrement_first)| {
            let mut body = String::new();
            for (offset, amount) in &moves {
                let (there, back) = if *offset >= 0 { ('>', '<') } else { ('<', '>') };
                let distance = offset.unsigned_abs() as usize;
                body.extend(std::iter::repeat(there).take(distance));
                let step = if *amount >= 0 { '+' } else { '-' };
                body.extend(std::iter::repeat(step).take(amount.unsigned_abs() as usize));
                body.extend(std::iter::repeat(back).take(distance));
            }
            let net_counter: i32 = moves
                .iter()
                .filter(|(offset, _)| *offset == 0)
                .map(|(_, amount)| amount)
                .sum();
            // Cancel whatever the moves did to the counter, then decrement once
            let fix = -net_counter - 1;
            let fix_str: String = std::iter::repeat(if fix >= 0 { '+' } else { '-' })
                .take(fix.unsigned_abs() as usize)
                .collect();

            let body = if decrement_first {
                format!("{}{}", fix_str, body)
            } else {
                format!("{}{}", body, fix_str)
            };
            format!("{}[{}]>.<.", "+".repeat(counter), body)
        })
}

/// One piece of a loop body: a visit to a nearby cell that either adjusts
/// it or clears it with `[-]`
#[derive(Debug, Clone)]
enum BodyStep {
    Add(i32, i32),
    Clear(i32),
}

fn body_step() -> impl Strategy<Value = BodyStep> {
    prop_oneof![
        3 => (-3i32..=3, -3i32..=3).prop_map(|(offset, amount)| BodyStep::Add(offset, amount)),
        1 => (-2i32..=2).prop_map(BodyStep::Clear),
    ]
}

/// A counted loop whose body mixes transfers with clears, including clears
/// of the counter itself and writes to cells cleared earlier in the body
fn linear_loop_with_clears() -> impl Strategy<Value = String> {
    (1usize..12, prop::collection::vec(body_step(), 1..6)).prop_map(|(counter, steps)| {
        let mut body = String::from("-");
        for step in &steps {
            let (offset, action) = match *step {
                BodyStep::Add(offset, amount) => {
                    let sign = if amount >= 0 { "+" } else { "-" };
                    (offset, sign.repeat(amount.unsigned_abs() as usize))
                }
                BodyStep::Clear(offset) => (offset, "[-]".to_string()),
            };
            let (there, back) = if offset >= 0 { (">", "<") } else { ("<", ">") };
            let distance = offset.unsigned_abs() as usize;
            body.push_str(&there.repeat(distance));
            body.push_str(&action);
            body.push_str(&back.repeat(distance));
        }
        format!("{}[{}]<<.>.>.>.>.<<", "+".repeat(counter), body)
    })
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn optimizer_preserves_length_and_pairing(source in bracketed_program()) {
        let raw = assemble(source.as_bytes()).unwrap();
        let optimized = optimize(raw.clone()).program;
        prop_assert_eq!(raw.len(), optimized.len());
        prop_assert!(raw.check_jumps());
        prop_assert!(optimized.check_jumps());
    }

    #[test]
    fn optimized_run_matches_raw_run(
        source in bracketed_program(),
        input in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let config = test_config();
        let raw = assemble(source.as_bytes()).unwrap();
        let optimized = optimize(raw.clone()).program;

        let left = Executor::new(&raw, &config, input.iter().copied(), Vec::new()).run();
        // Only terminating, in-bounds programs have a result to compare
        let Ok(left) = left else {
            return Ok(());
        };

        let right = Executor::new(&optimized, &config, input.iter().copied(), Vec::new())
            .run()
            .unwrap();
        prop_assert_eq!(&left.output, &right.output);
        prop_assert_eq!(&left.tape, &right.tape);
        prop_assert_eq!(left.pointer, right.pointer);
        prop_assert!(right.steps <= left.steps);

        prop_assert!(validate(&raw, &optimized, &config, &input).is_ok());
    }

    #[test]
    fn linear_loops_are_rewritten(source in linear_loop_program()) {
        let raw = assemble(source.as_bytes()).unwrap();
        let result = optimize(raw.clone());
        prop_assert_eq!(result.rewritten_loops, 1);
        prop_assert!(result.warnings.is_empty());

        let config = test_config();
        let report = validate(&raw, &result.program, &config, b"");
        prop_assert!(report.is_ok(), "{:?}", report);
    }

    #[test]
    fn loops_with_clears_match_raw_run(source in linear_loop_with_clears()) {
        let config = test_config();
        let raw = assemble(source.as_bytes()).unwrap();
        let optimized = optimize(raw.clone()).program;

        let left = Executor::new(&raw, &config, std::iter::empty(), Vec::new()).run();
        // Counter writes after a clear can keep the loop alive forever
        let Ok(left) = left else {
            return Ok(());
        };

        let right = Executor::new(&optimized, &config, std::iter::empty(), Vec::new())
            .run()
            .unwrap();
        prop_assert_eq!(&left.output, &right.output);
        prop_assert_eq!(&left.tape, &right.tape);
        prop_assert_eq!(left.pointer, right.pointer);

        let report = validate(&raw, &optimized, &config, b"");
        prop_assert!(report.is_ok(), "{:?}", report);
    }

    #[test]
    fn assembler_never_panics(source in prop::collection::vec(any::<u8>(), 0..200)) {
        match assemble(&source) {
            Ok(program) => prop_assert!(program.check_jumps()),
            Err(err) => prop_assert!(err.is_assembly_error()),
        }
    }
}

#[test]
fn test_step_budget_stops_unbounded_loop() {
    let raw = assemble(b"+[>+<]").unwrap();
    let err = Executor::new(&raw, &test_config(), std::iter::empty(), Vec::new())
        .run()
        .unwrap_err();
    assert_eq!(err, Error::ExecutionLimitExceeded { limit: 20_000 });
}
