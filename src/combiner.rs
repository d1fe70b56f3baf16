use crate::context::Context;
use crate::instruction::{Instruction, Opcode};
use crate::state::{Local, State};
use crate::value::Value;

/// The concrete instruction list for one combination: depth-many selected
/// patterns concatenated in depth order, with `nxt` placeholders stripped.
#[derive(Debug, Clone)]
pub struct Combination {
    pub instructions: Vec<Instruction>,
}

/// Decompose `index` into a per-depth pattern selection, base `pattern_count`.
/// Slot `depth - 1` (the last pattern in the combination) varies fastest;
/// slot `0` varies slowest — this mirrors `permute_patterns` in the source's
/// `combiner.c` exactly, so combination indices stay stable against any
/// golden-file expectations.
pub fn decompose_combination_index(index: u64, depth: usize, pattern_count: usize) -> Vec<usize> {
    if pattern_count == 0 || depth == 0 {
        return vec![0; depth];
    }
    let pattern_count = pattern_count as u64;
    (0..depth)
        .map(|j| {
            let divisor = pattern_count.pow((depth - 1 - j) as u32);
            ((index / divisor) % pattern_count) as usize
        })
        .collect()
}

pub fn combine(ctx: &Context, index: u64) -> Combination {
    let selection = decompose_combination_index(index, ctx.depth, ctx.pattern_count());
    let mut instructions = Vec::new();
    for (depth, &pattern_index) in selection.iter().enumerate() {
        let pattern = &ctx.patterns[pattern_index];
        for inst in &pattern.instructions {
            if inst.op == Opcode::Nxt {
                continue;
            }
            instructions.push(Instruction::with_depth(inst.op, inst.operands.clone(), depth));
        }
    }
    Combination { instructions }
}

/// Build the root `State` for a combination, seeded with `input_names` bound
/// to `case_inputs` (the first case, per SPEC_FULL.md §3).
pub fn load_combination(
    input_names: &[String],
    case_inputs: &[Value],
    combination: &Combination,
) -> State {
    let locals = input_names
        .iter()
        .zip(case_inputs.iter())
        .map(|(name, value)| Local::new(name.clone(), value.clone()))
        .collect();
    State::new(locals, combination.instructions.clone())
}
