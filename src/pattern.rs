use crate::instruction::Instruction;

/// An ordered list of instructions, possibly containing wildcards, loaded
/// from one `.pattern` file.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self { name: name.into(), instructions }
    }
}
