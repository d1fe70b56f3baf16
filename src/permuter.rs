use crate::context::Context;
use crate::instruction::Instruction;
use crate::operand::{Operand, CONSTANTS, LOCALS};
use crate::state::State;

/// All concrete operands a wildcard with the given mask may be substituted
/// with, in the order the permuter indexes them: locals first (if selected),
/// then constants (if selected) — matching the original's
/// `permute_param`/`count_param_substitutions` ordering.
fn substitution_candidates(ctx: &Context, state: &State, mask: u8) -> Vec<Operand> {
    let mut candidates = Vec::new();
    if mask & LOCALS != 0 {
        candidates.extend(state.locals.iter().map(|slot| Operand::Label(slot.value.name.clone())));
    }
    if mask & CONSTANTS != 0 {
        candidates.extend(ctx.constants.iter().map(|c| Operand::Literal(c.clone())));
    }
    candidates
}

/// Reject `(t, a, b)` if an earlier-accepted tuple `(t, b, a)` exists — the
/// only symmetry the source prunes, and only for 3-operand add/mul.
fn is_commutative_duplicate(inst: &Instruction, accepted: &[Instruction]) -> bool {
    if !inst.op.is_commutative() || inst.operands.len() != 3 {
        return false;
    }
    accepted.iter().any(|other| {
        other.op == inst.op
            && other.operands[0] == inst.operands[0]
            && other.operands[1] == inst.operands[2]
            && other.operands[2] == inst.operands[1]
    })
}

/// Enumerate every concrete variant of `inst`'s wildcards in vertical-major
/// order: the first wildcard varies fastest. For wildcard `d` with per-slot
/// candidate count `c_d`, the entry chosen at enumeration index `p` is
/// `(p / prod(c_e for e < d)) mod c_d` — SPEC_FULL.md §4.2.
pub fn permute_instruction(ctx: &Context, state: &State, inst: &Instruction) -> Vec<Instruction> {
    let wildcard_indices: Vec<usize> = inst
        .operands
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_wildcard())
        .map(|(i, _)| i)
        .collect();

    if wildcard_indices.is_empty() {
        return vec![inst.clone()];
    }

    let candidate_lists: Vec<Vec<Operand>> = wildcard_indices
        .iter()
        .map(|&i| match &inst.operands[i] {
            Operand::Wildcard(mask) => substitution_candidates(ctx, state, *mask),
            _ => unreachable!(),
        })
        .collect();

    let counts: Vec<usize> = candidate_lists.iter().map(|c| c.len()).collect();
    let total: usize = counts.iter().product();

    let mut accepted = Vec::new();
    for p in 0..total {
        let mut divisor = 1usize;
        let mut candidate = inst.clone();
        for (d, &slot) in wildcard_indices.iter().enumerate() {
            let choice = (p / divisor) % counts[d].max(1);
            candidate.operands[slot] = candidate_lists[d][choice].clone();
            divisor *= counts[d].max(1);
        }
        if !is_commutative_duplicate(&candidate, &accepted) {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;
    use crate::pattern::Pattern;
    use crate::state::Local;
    use crate::value::Value;
    use std::sync::Arc;

    fn ctx_with_constants(constants: Vec<Value>) -> Context {
        Context {
            input_names: Arc::new(vec![]),
            cases: Arc::new(vec![]),
            patterns: Arc::new(Vec::<Pattern>::new()),
            constants: Arc::new(constants),
            precision: Value::Int(0),
            depth: 1,
        }
    }

    #[test]
    fn permutation_count_matches_product_of_wildcard_counts() {
        let ctx = ctx_with_constants(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let state = State::new(
            vec![Local::new("x", Value::Int(0)), Local::new("y", Value::Int(0))],
            vec![],
        );
        let inst = Instruction::new(
            Opcode::Let,
            vec![Operand::Label("x".into()), Operand::Wildcard(CONSTANTS)],
        );
        let variants = permute_instruction(&ctx, &state, &inst);
        assert_eq!(variants.len(), 3);
    }

    #[test]
    fn three_operand_add_dedups_commutative_variants() {
        let ctx = ctx_with_constants(vec![]);
        let state = State::new(
            vec![Local::new("a", Value::Int(0)), Local::new("b", Value::Int(0))],
            vec![],
        );
        let inst = Instruction::new(
            Opcode::Add,
            vec![
                Operand::Label("a".into()),
                Operand::Wildcard(LOCALS),
                Operand::Wildcard(LOCALS),
            ],
        );
        let variants = permute_instruction(&ctx, &state, &inst);
        // (a,a) (a,b) (b,a)->dup of (a,b) (b,b): 2*2=4 raw, one dup pruned => 3
        assert_eq!(variants.len(), 3);
    }

    #[test]
    fn non_commutative_opcode_is_unaffected_by_dedup() {
        let ctx = ctx_with_constants(vec![]);
        let state = State::new(
            vec![Local::new("a", Value::Int(0)), Local::new("b", Value::Int(0))],
            vec![],
        );
        let inst = Instruction::new(
            Opcode::Div,
            vec![
                Operand::Label("a".into()),
                Operand::Wildcard(LOCALS),
                Operand::Wildcard(LOCALS),
            ],
        );
        let variants = permute_instruction(&ctx, &state, &inst);
        assert_eq!(variants.len(), 4);
    }

    #[test]
    fn no_wildcards_returns_the_instruction_unchanged() {
        let ctx = ctx_with_constants(vec![]);
        let state = State::new(vec![], vec![]);
        let inst = Instruction::new(Opcode::Ret, vec![Operand::Label("z".into())]);
        let variants = permute_instruction(&ctx, &state, &inst);
        assert_eq!(variants, vec![inst]);
    }
}
