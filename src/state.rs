use std::sync::Arc;

use crate::errors::InterpretError;
use crate::instruction::Instruction;
use crate::value::Value;

/// A named binding. Names are unique within a single `State`'s local list.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub name: String,
    pub value: Value,
}

impl Local {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self { name: name.into(), value }
    }
}

/// One slot in a `State`'s local or instruction list: a shared handle plus
/// whether this particular `State` is the slot's owner.
///
/// "Owned" does not gate memory safety here — `Arc`'s refcount frees the
/// payload once the last handle drops regardless of this flag. The flag
/// exists so the borrow-discipline invariants in SPEC_FULL.md §4.4 stay
/// checkable: a slot is owned by exactly the `State` that produced it, and
/// every fork's slots start out borrowed.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    pub value: Arc<T>,
    pub owned: bool,
}

impl<T> Slot<T> {
    pub fn owned(value: T) -> Self {
        Self { value: Arc::new(value), owned: true }
    }

    pub fn borrowed(value: Arc<T>) -> Self {
        Self { value, owned: false }
    }
}

/// A search/execution node: the program under consideration, its locals,
/// the program counter, and the last `ret`'d value, if any.
#[derive(Debug, Clone)]
pub struct State {
    pub locals: Vec<Slot<Local>>,
    pub instructions: Vec<Slot<Instruction>>,
    pub ip: usize,
    pub ret: Option<Value>,
}

impl State {
    pub fn new(locals: Vec<Local>, instructions: Vec<Instruction>) -> Self {
        Self {
            locals: locals.into_iter().map(Slot::owned).collect(),
            instructions: instructions.into_iter().map(Slot::owned).collect(),
            ip: 0,
            ret: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ret.is_some() || self.ip >= self.instructions.len()
    }

    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.instructions.get(self.ip).map(|slot| slot.value.as_ref())
    }

    pub fn find_local(&self, name: &str) -> Option<usize> {
        self.locals.iter().position(|slot| slot.value.name == name)
    }

    pub fn local_value(&self, name: &str) -> Result<&Value, InterpretError> {
        self.find_local(name)
            .map(|i| &self.locals[i].value.value)
            .ok_or_else(|| InterpretError::UndefinedLocal(name.to_string()))
    }

    /// A shallow, borrow-producing copy: every slot clones its `Arc` handle
    /// and the clone's ownership flag is always `false`. The caller
    /// (`vary`/`interpret`) then overwrites whichever slot it mutates and
    /// marks only that slot `owned`.
    pub fn fork(&self) -> State {
        State {
            locals: self
                .locals
                .iter()
                .map(|s| Slot::borrowed(Arc::clone(&s.value)))
                .collect(),
            instructions: self
                .instructions
                .iter()
                .map(|s| Slot::borrowed(Arc::clone(&s.value)))
                .collect(),
            ip: self.ip,
            ret: self.ret.clone(),
        }
    }

    pub fn push_local(&mut self, local: Local) {
        self.locals.push(Slot::owned(local));
    }

    pub fn replace_local(&mut self, index: usize, local: Local) {
        self.locals[index] = Slot::owned(local);
    }

    pub fn replace_instruction(&mut self, index: usize, instruction: Instruction) {
        self.instructions[index] = Slot::owned(instruction);
    }
}
