use crate::context::Context;
use crate::instruction::{Instruction, Opcode};
use crate::interpreter::{interpret, run_to_completion};
use crate::operand::Operand;
use crate::state::State;
use crate::value::{compare, Value};

/// One fork per permutation of the current instruction. An instruction with
/// no wildcards yields a single fork that still borrows the shared
/// instruction object — no substitution means no new owner.
pub fn vary(ctx: &Context, state: &State) -> Vec<State> {
    let inst = state
        .current_instruction()
        .expect("vary called on a finished state")
        .clone();

    if inst.wildcard_count() == 0 {
        return vec![state.fork()];
    }

    crate::permuter::permute_instruction(ctx, state, &inst)
        .into_iter()
        .map(|concrete| {
            let mut child = state.fork();
            let ip = child.ip;
            child.replace_instruction(ip, concrete);
            child
        })
        .collect()
}

/// The name of the first local whose value compares equal (within
/// `ctx.precision`) to `expected`, if any. Tag mismatches are treated as "no
/// match" here, not a fatal error — only a malformed `precision` declaration
/// itself is fatal, and that is caught once at context construction.
fn find_local_matching(ctx: &Context, state: &State, expected: &Value) -> Option<String> {
    state.locals.iter().find_map(|slot| {
        match compare(&ctx.precision, expected, &slot.value.value) {
            Ok(true) => Some(slot.value.name.clone()),
            _ => None,
        }
    })
}

/// Re-run the candidate's instruction prefix (up to and including its
/// current instruction) plus a synthesised `ret <hit>` against every case
/// but the first. Returns the validated instruction list if every case's
/// expected output matches.
fn validate_all_cases(ctx: &Context, candidate: &State, hit_name: &str) -> Option<Vec<Instruction>> {
    let upto = candidate.ip.min(candidate.instructions.len());
    let mut instructions: Vec<Instruction> = candidate.instructions[..upto]
        .iter()
        .map(|slot| (*slot.value).clone())
        .collect();
    instructions.push(Instruction::new(Opcode::Ret, vec![Operand::Label(hit_name.to_string())]));

    for case in ctx.cases.iter().skip(1) {
        let mut state = crate::combiner::load_combination(
            &ctx.input_names,
            &case.inputs,
            &crate::combiner::Combination { instructions: instructions.clone() },
        );
        let ret = match run_to_completion(&mut state) {
            Ok(Some(v)) => v,
            _ => return None,
        };
        match compare(&ctx.precision, &ret, &case.expected) {
            Ok(true) => continue,
            _ => return None,
        }
    }
    Some(instructions)
}

/// Depth-first search over one combination. `on_progress` is called once per
/// finished branch (a program that reaches `ret` or runs off the end);
/// `on_solution` once per validated solution. Returns the total number of
/// completed branches.
pub fn search(
    ctx: &Context,
    root: State,
    find_all: bool,
    mut on_progress: impl FnMut(u64),
    mut on_solution: impl FnMut(&[Instruction]),
) -> u64 {
    let mut completed = 0u64;
    let mut stop = false;
    step(ctx, vec![root], find_all, &mut completed, &mut stop, &mut on_progress, &mut on_solution);
    completed
}

fn step(
    ctx: &Context,
    states: Vec<State>,
    find_all: bool,
    completed: &mut u64,
    stop: &mut bool,
    on_progress: &mut impl FnMut(u64),
    on_solution: &mut impl FnMut(&[Instruction]),
) {
    for s in states {
        if *stop {
            return;
        }
        if s.is_finished() {
            *completed += 1;
            on_progress(*completed);
            // A program with no remaining instructions (depth 0, or one that
            // already `ret`'d) may still have a local that matches the
            // first case's expected output without any further stepping —
            // SPEC_FULL.md §8 Scenario B (identity).
            if let Some(hit_name) = find_local_matching(ctx, &s, &ctx.cases[0].expected) {
                if let Some(solution) = validate_all_cases(ctx, &s, &hit_name) {
                    on_solution(&solution);
                    if !find_all {
                        *stop = true;
                        return;
                    }
                }
            }
            continue;
        }

        for mut child in vary(ctx, &s) {
            if interpret(&mut child).is_err() {
                // Dead: silently prune this branch (SPEC_FULL.md §4.1).
                continue;
            }

            if let Some(hit_name) = find_local_matching(ctx, &child, &ctx.cases[0].expected) {
                if let Some(solution) = validate_all_cases(ctx, &child, &hit_name) {
                    on_solution(&solution);
                    if !find_all {
                        *stop = true;
                        return;
                    }
                }
            }

            step(ctx, vec![child], find_all, completed, stop, on_progress, on_solution);
            if *stop {
                return;
            }
        }
    }
}
