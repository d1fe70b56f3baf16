use std::fmt;
use std::str::FromStr;

use crate::operand::Operand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Let,
    Add,
    Mul,
    Div,
    Exp,
    Sin,
    Asin,
    Jmp,
    Cmp,
    Ret,
    Prt,
    /// Placeholder stripped by the combiner; never interpreted.
    Nxt,
}

impl Opcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Let => "let",
            Opcode::Add => "add",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Exp => "exp",
            Opcode::Sin => "sin",
            Opcode::Asin => "asin",
            Opcode::Jmp => "jmp",
            Opcode::Cmp => "cmp",
            Opcode::Ret => "ret",
            Opcode::Prt => "prt",
            Opcode::Nxt => "nxt",
        }
    }

    /// Arithmetic opcodes with exactly three operands are subject to the
    /// commutativity dedup the permuter applies (SPEC_FULL.md §4.2).
    pub fn is_commutative(&self) -> bool {
        matches!(self, Opcode::Add | Opcode::Mul)
    }
}

impl FromStr for Opcode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "let" => Opcode::Let,
            "add" => Opcode::Add,
            "mul" => Opcode::Mul,
            "div" => Opcode::Div,
            "exp" => Opcode::Exp,
            "sin" => Opcode::Sin,
            "asin" => Opcode::Asin,
            "jmp" => Opcode::Jmp,
            "cmp" => Opcode::Cmp,
            "ret" => Opcode::Ret,
            "prt" => Opcode::Prt,
            "nxt" => Opcode::Nxt,
            other => return Err(format!("unrecognized opcode `{other}`")),
        })
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An opcode plus its ordered operands. `pattern_depth` records which
/// combiner slot an instruction originated from; it is provenance only and
/// does not affect execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub op: Opcode,
    pub operands: Vec<Operand>,
    pub pattern_depth: usize,
}

impl Instruction {
    pub fn new(op: Opcode, operands: Vec<Operand>) -> Self {
        Self { op, operands, pattern_depth: 0 }
    }

    pub fn with_depth(op: Opcode, operands: Vec<Operand>, pattern_depth: usize) -> Self {
        Self { op, operands, pattern_depth }
    }

    pub fn wildcard_count(&self) -> usize {
        self.operands.iter().filter(|o| o.is_wildcard()).count()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}
