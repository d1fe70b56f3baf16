use crate::errors::InterpretError;
use crate::instruction::{Instruction, Opcode};
use crate::operand::Operand;
use crate::state::{Local, State};
use crate::value::Value;

/// Result of advancing a `State` by one instruction. `Dead` is not an error:
/// it is the signal that lets a search branch be silently pruned instead of
/// aborting the whole run, per SPEC_FULL.md §4.1's redesign of the original's
/// process-fatal type errors.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Advanced,
    Returned(Value),
}

fn resolve<'a>(state: &'a State, operand: &'a Operand) -> Result<&'a Value, InterpretError> {
    match operand {
        Operand::Label(name) => state.local_value(name),
        Operand::Literal(v) => Ok(v),
        Operand::Wildcard(_) => Err(InterpretError::UnresolvedWildcard),
    }
}

fn numeric_binop(
    op: Opcode,
    left: &Value,
    right: &Value,
    current: &Value,
) -> Result<Value, InterpretError> {
    match (left, right, current) {
        (Value::Int(a), Value::Int(b), Value::Int(_)) => match op {
            Opcode::Add => Ok(Value::Int(a.wrapping_add(*b))),
            Opcode::Mul => Ok(Value::Int(a.wrapping_mul(*b))),
            Opcode::Div => {
                if *b == 0 {
                    Err(InterpretError::DivisionByZero)
                } else {
                    Ok(Value::Int(a / b))
                }
            }
            Opcode::Exp => Err(InterpretError::TypeMismatch {
                op: "exp",
                detail: "exp is only defined on float/double operands".into(),
            }),
            _ => unreachable!("numeric_binop only called for add/mul/div/exp"),
        },
        (Value::Float(a), Value::Float(b), Value::Float(_)) => Ok(Value::Float(match op {
            Opcode::Add => a + b,
            Opcode::Mul => a * b,
            Opcode::Div => a / b,
            Opcode::Exp => a.powf(*b),
            _ => unreachable!(),
        })),
        (Value::Double(a), Value::Double(b), Value::Double(_)) => Ok(Value::Double(match op {
            Opcode::Add => a + b,
            Opcode::Mul => a * b,
            Opcode::Div => a / b,
            Opcode::Exp => a.powf(*b),
            _ => unreachable!(),
        })),
        (l, r, t) => Err(InterpretError::TypeMismatch {
            op: op.as_str(),
            detail: format!("{}, {}, {}", l.tag(), r.tag(), t.tag()),
        }),
    }
}

fn unary_float(op: Opcode, src: &Value) -> Result<Value, InterpretError> {
    match src {
        Value::Float(v) => Ok(Value::Float(match op {
            Opcode::Sin => v.sin(),
            Opcode::Asin => v.asin(),
            _ => unreachable!(),
        })),
        Value::Double(v) => Ok(Value::Double(match op {
            Opcode::Sin => v.sin(),
            Opcode::Asin => v.asin(),
            _ => unreachable!(),
        })),
        Value::Int(v) => {
            let f = *v as f32;
            Ok(Value::Float(match op {
                Opcode::Sin => f.sin(),
                Opcode::Asin => f.asin(),
                _ => unreachable!(),
            }))
        }
        other => Err(InterpretError::TypeMismatch {
            op: op.as_str(),
            detail: other.tag().to_string(),
        }),
    }
}

/// Advance `state` by one instruction in place. `ip` is not incremented for
/// `jmp`/`cmp`-taken/`ret`, matching the source interpreter's early returns.
pub fn interpret(state: &mut State) -> Result<StepOutcome, InterpretError> {
    let inst = state
        .current_instruction()
        .expect("interpret called on a finished state")
        .clone();

    match inst.op {
        Opcode::Let => {
            let value = resolve(state, &inst.operands[1])?.clone();
            let name = match &inst.operands[0] {
                Operand::Label(n) => n.clone(),
                other => {
                    return Err(InterpretError::TypeMismatch {
                        op: "let",
                        detail: format!("target must be a label, got {other}"),
                    })
                }
            };
            state.push_local(Local::new(name, value));
            state.ip += 1;
            Ok(StepOutcome::Advanced)
        }
        Opcode::Add | Opcode::Mul | Opcode::Div | Opcode::Exp => {
            let target_name = match &inst.operands[0] {
                Operand::Label(n) => n.clone(),
                other => {
                    return Err(InterpretError::TypeMismatch {
                        op: inst.op.as_str(),
                        detail: format!("target must be a label, got {other}"),
                    })
                }
            };
            let target_index = state
                .find_local(&target_name)
                .ok_or_else(|| InterpretError::UndefinedLocal(target_name.clone()))?;
            let left = resolve(state, &inst.operands[1])?.clone();
            let right = resolve(state, &inst.operands[2])?.clone();
            let current = state.locals[target_index].value.value.clone();
            let result = numeric_binop(inst.op, &left, &right, &current)?;
            state.replace_local(target_index, Local::new(target_name, result));
            state.ip += 1;
            Ok(StepOutcome::Advanced)
        }
        Opcode::Sin | Opcode::Asin => {
            let target_name = match &inst.operands[0] {
                Operand::Label(n) => n.clone(),
                other => {
                    return Err(InterpretError::TypeMismatch {
                        op: inst.op.as_str(),
                        detail: format!("target must be a label, got {other}"),
                    })
                }
            };
            let target_index = state
                .find_local(&target_name)
                .ok_or_else(|| InterpretError::UndefinedLocal(target_name.clone()))?;
            let src = resolve(state, &inst.operands[1])?.clone();
            let result = unary_float(inst.op, &src)?;
            state.replace_local(target_index, Local::new(target_name, result));
            state.ip += 1;
            Ok(StepOutcome::Advanced)
        }
        Opcode::Jmp => {
            let target = match &inst.operands[0] {
                Operand::Literal(Value::Int(n)) => *n as usize,
                other => {
                    return Err(InterpretError::TypeMismatch {
                        op: "jmp",
                        detail: format!("target must be an int literal, got {other}"),
                    })
                }
            };
            state.ip = target;
            Ok(StepOutcome::Advanced)
        }
        Opcode::Cmp => {
            let left = resolve(state, &inst.operands[0])?.clone();
            let right = resolve(state, &inst.operands[1])?.clone();
            let (Value::Int(a), Value::Int(b)) = (&left, &right) else {
                return Err(InterpretError::NonIntegerCompare);
            };
            if a == b {
                let target = match &inst.operands[2] {
                    Operand::Literal(Value::Int(n)) => *n as usize,
                    other => {
                        return Err(InterpretError::TypeMismatch {
                            op: "cmp",
                            detail: format!("target must be an int literal, got {other}"),
                        })
                    }
                };
                state.ip = target;
            } else {
                state.ip += 1;
            }
            Ok(StepOutcome::Advanced)
        }
        Opcode::Prt => {
            let value = resolve(state, &inst.operands[0])?.clone();
            match value {
                Value::Int(n) => println!("{n}"),
                other => {
                    return Err(InterpretError::TypeMismatch {
                        op: "prt",
                        detail: format!("printing is only defined for int, got {}", other.tag()),
                    })
                }
            }
            state.ip += 1;
            Ok(StepOutcome::Advanced)
        }
        Opcode::Ret => {
            let value = resolve(state, &inst.operands[0])?.clone();
            state.ret = Some(value.clone());
            state.ip = state.instructions.len();
            Ok(StepOutcome::Returned(value))
        }
        Opcode::Nxt => Err(InterpretError::TypeMismatch {
            op: "nxt",
            detail: "nxt is a placeholder and must be stripped before interpretation".into(),
        }),
    }
}

/// Run `state` to completion, for use on a candidate with no remaining
/// wildcards (e.g. in `validate_all_cases` or `cold run`).
pub fn run_to_completion(state: &mut State) -> Result<Option<Value>, InterpretError> {
    while !state.is_finished() {
        interpret(state)?;
    }
    Ok(state.ret.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;
    use crate::operand::Operand;

    fn instructions(list: Vec<Instruction>) -> Vec<Instruction> {
        list
    }

    #[test]
    fn let_appends_a_new_owned_local() {
        let mut state = State::new(
            vec![],
            instructions(vec![Instruction::new(
                Opcode::Let,
                vec![Operand::Label("x".into()), Operand::Literal(Value::Int(7))],
            )]),
        );
        interpret(&mut state).unwrap();
        assert_eq!(state.local_value("x").unwrap(), &Value::Int(7));
        assert_eq!(state.ip, 1);
    }

    #[test]
    fn add_replaces_target_with_a_new_local() {
        let mut state = State::new(
            vec![Local::new("x", Value::Int(1)), Local::new("y", Value::Int(2))],
            instructions(vec![Instruction::new(
                Opcode::Add,
                vec![
                    Operand::Label("x".into()),
                    Operand::Label("x".into()),
                    Operand::Label("y".into()),
                ],
            )]),
        );
        interpret(&mut state).unwrap();
        assert_eq!(state.local_value("x").unwrap(), &Value::Int(3));
    }

    #[test]
    fn int_division_by_zero_is_fatal() {
        let mut state = State::new(
            vec![Local::new("x", Value::Int(1)), Local::new("y", Value::Int(0))],
            instructions(vec![Instruction::new(
                Opcode::Div,
                vec![
                    Operand::Label("x".into()),
                    Operand::Label("x".into()),
                    Operand::Label("y".into()),
                ],
            )]),
        );
        assert!(matches!(interpret(&mut state), Err(InterpretError::DivisionByZero)));
    }

    #[test]
    fn cmp_on_non_integers_is_fatal() {
        let mut state = State::new(
            vec![Local::new("x", Value::Float(1.0)), Local::new("y", Value::Float(1.0))],
            instructions(vec![Instruction::new(
                Opcode::Cmp,
                vec![
                    Operand::Label("x".into()),
                    Operand::Label("y".into()),
                    Operand::Literal(Value::Int(0)),
                ],
            )]),
        );
        assert!(matches!(interpret(&mut state), Err(InterpretError::NonIntegerCompare)));
    }

    #[test]
    fn ret_sets_ret_and_terminates_execution() {
        let mut state = State::new(
            vec![Local::new("x", Value::Int(5))],
            instructions(vec![Instruction::new(Opcode::Ret, vec![Operand::Label("x".into())])]),
        );
        interpret(&mut state).unwrap();
        assert_eq!(state.ret, Some(Value::Int(5)));
        assert!(state.is_finished());
    }
}
