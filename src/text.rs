//! Parsers for the three `cold` text formats: `.solve`, `.pattern`, `.cold`.
//! Grammars are deliberately trivial (SPEC_FULL.md §6) — this module is a
//! thin tokenizer, not a general-purpose lexer/parser pair.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::Case;
use crate::errors::ParseError;
use crate::instruction::{Instruction, Opcode};
use crate::operand::{Operand, CONSTANTS, LOCALS};
use crate::pattern::Pattern;
use crate::value::Value;

static CASE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^case\s*\(([^)]*)\)\s*=>\s*(\S+)$").unwrap());

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Parse one value literal: a bare integer (`7`), a float (`7.0f`), a
/// higher-precision float (`7.0L`), or a quoted string (`"hi"`).
pub fn parse_value_literal(file: &str, line: usize, token: &str) -> Result<Value, ParseError> {
    if token.starts_with('"') && token.ends_with('"') && token.len() >= 2 {
        return Ok(Value::Str(token[1..token.len() - 1].to_string()));
    }
    if let Some(body) = token.strip_suffix('f').or_else(|| token.strip_suffix('F')) {
        return body
            .parse::<f32>()
            .map(Value::Float)
            .map_err(|e| ParseError::new(file, line, token, format!("invalid float literal: {e}")));
    }
    if let Some(body) = token.strip_suffix('L') {
        return body
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| ParseError::new(file, line, token, format!("invalid double literal: {e}")));
    }
    token
        .parse::<i32>()
        .map(Value::Int)
        .map_err(|e| ParseError::new(file, line, token, format!("invalid int literal: {e}")))
}

/// Parse one operand token: `$name` (Label), `!l`/`!c`/`!lc` (Wildcard), or a
/// literal in the encoding `parse_value_literal` understands.
pub fn parse_operand(file: &str, line: usize, token: &str) -> Result<Operand, ParseError> {
    if let Some(name) = token.strip_prefix('$') {
        return Ok(Operand::Label(name.to_string()));
    }
    if let Some(flags) = token.strip_prefix('!') {
        let mut mask = 0u8;
        for c in flags.chars() {
            match c {
                'l' => mask |= LOCALS,
                'c' => mask |= CONSTANTS,
                other => {
                    return Err(ParseError::new(
                        file,
                        line,
                        token,
                        format!("unrecognized wildcard flag `{other}`"),
                    ))
                }
            }
        }
        return Ok(Operand::Wildcard(mask));
    }
    parse_value_literal(file, line, token).map(Operand::Literal)
}

/// Parse one instruction line: opcode followed by space-separated operands.
pub fn parse_instruction_line(file: &str, line: usize, text: &str) -> Result<Instruction, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (op_token, operand_tokens) = tokens
        .split_first()
        .ok_or_else(|| ParseError::new(file, line, text, "empty instruction line"))?;
    let op: Opcode = op_token
        .parse()
        .map_err(|e| ParseError::new(file, line, text, e))?;
    let operands = operand_tokens
        .iter()
        .map(|t| parse_operand(file, line, t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Instruction::new(op, operands))
}

/// Parse a whole `.pattern` file: one instruction per non-blank,
/// non-comment-only line.
pub fn parse_pattern_file(name: &str, file: &str, text: &str) -> Result<Pattern, ParseError> {
    let mut instructions = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let stripped = strip_comment(raw);
        if is_blank(stripped) {
            continue;
        }
        instructions.push(parse_instruction_line(file, i + 1, stripped.trim())?);
    }
    Ok(Pattern::new(name, instructions))
}

/// The fields a `.solve` file can populate. `precision`/`depth` fall back to
/// the documented defaults (§6) when absent.
#[derive(Debug, Default)]
pub struct SolverFile {
    pub precision: Option<Value>,
    pub depth: Option<usize>,
    pub pattern_names: Vec<String>,
    pub constants: Vec<Value>,
    pub input_names: Vec<String>,
    pub cases: Vec<Case>,
}

/// Parse a `.solve` file per SPEC_FULL.md §6's directive grammar.
pub fn parse_solver_file(file: &str, text: &str) -> Result<SolverFile, ParseError> {
    let mut out = SolverFile::default();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let stripped = strip_comment(raw).trim();
        if stripped.is_empty() {
            continue;
        }

        if let Some(rest) = stripped.strip_prefix("precision ") {
            out.precision = Some(parse_value_literal(file, line_no, rest.trim())?);
        } else if let Some(rest) = stripped.strip_prefix("depth ") {
            out.depth = Some(rest.trim().parse::<usize>().map_err(|e| {
                ParseError::new(file, line_no, stripped, format!("invalid depth: {e}"))
            })?);
        } else if let Some(rest) = stripped.strip_prefix("pattern ") {
            out.pattern_names.push(rest.trim().to_string());
        } else if let Some(rest) = stripped.strip_prefix("constant ") {
            out.constants.push(parse_value_literal(file, line_no, rest.trim())?);
        } else if let Some(rest) = stripped.strip_prefix("input ") {
            out.input_names.push(rest.trim().to_string());
        } else if let Some(caps) = CASE_LINE.captures(stripped) {
            let inputs = caps[1]
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|tok| parse_value_literal(file, line_no, tok))
                .collect::<Result<Vec<_>, _>>()?;
            if inputs.len() != out.input_names.len() {
                return Err(ParseError::new(
                    file,
                    line_no,
                    stripped,
                    format!(
                        "case has {} argument(s), expected {} (declared input(s))",
                        inputs.len(),
                        out.input_names.len()
                    ),
                ));
            }
            let expected = parse_value_literal(file, line_no, caps[2].trim())?;
            out.cases.push(Case { inputs, expected });
        } else {
            return Err(ParseError::new(file, line_no, stripped, "unrecognized directive"));
        }
    }

    Ok(out)
}

/// A parsed `.cold` program: the `def` header's parameter names and its body.
#[derive(Debug, Clone)]
pub struct ColdProgram {
    pub name: String,
    pub param_names: Vec<String>,
    pub instructions: Vec<Instruction>,
}

/// Parse a `.cold` file: a `def <name> $arg1 …` header followed by
/// instruction lines (indentation is cosmetic and ignored).
pub fn parse_cold_file(file: &str, text: &str) -> Result<ColdProgram, ParseError> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !is_blank(strip_comment(l)));

    let (header_no, header) = lines
        .next()
        .ok_or_else(|| ParseError::new(file, 0, "", "empty program file"))?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.first() != Some(&"def") || tokens.len() < 2 {
        return Err(ParseError::new(file, header_no + 1, header, "expected `def <name> $arg...`"));
    }
    let name = tokens[1].to_string();
    let param_names = tokens[2..]
        .iter()
        .map(|t| t.trim_start_matches('$').to_string())
        .collect();

    let mut instructions = Vec::new();
    for (i, raw) in lines {
        instructions.push(parse_instruction_line(file, i + 1, strip_comment(raw).trim())?);
    }

    Ok(ColdProgram { name, param_names, instructions })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_literals() {
        assert_eq!(parse_value_literal("t", 1, "7").unwrap(), Value::Int(7));
        assert_eq!(parse_value_literal("t", 1, "7.5f").unwrap(), Value::Float(7.5));
        assert_eq!(parse_value_literal("t", 1, "7.5L").unwrap(), Value::Double(7.5));
        assert_eq!(parse_value_literal("t", 1, "\"hi\"").unwrap(), Value::Str("hi".into()));
    }

    #[test]
    fn parses_an_instruction_line_with_wildcards() {
        let inst = parse_instruction_line("t", 1, "add $x !l !c").unwrap();
        assert_eq!(inst.op, Opcode::Add);
        assert_eq!(inst.operands[1], Operand::Wildcard(LOCALS));
        assert_eq!(inst.operands[2], Operand::Wildcard(CONSTANTS));
    }

    #[test]
    fn parses_a_solve_file() {
        let text = "\
            input z\n\
            precision 0.5f\n\
            depth 2\n\
            pattern arith\n\
            constant 300000000.0f\n\
            case (1.0f) => 2.0f\n\
        ";
        let parsed = parse_solver_file("t.solve", text).unwrap();
        assert_eq!(parsed.input_names, vec!["z"]);
        assert_eq!(parsed.depth, Some(2));
        assert_eq!(parsed.pattern_names, vec!["arith"]);
        assert_eq!(parsed.cases.len(), 1);
        assert_eq!(parsed.cases[0].expected, Value::Float(2.0));
    }

    #[test]
    fn case_argument_count_must_match_declared_inputs() {
        let text = "input a\ninput b\ncase (1) => 2\n";
        assert!(parse_solver_file("t.solve", text).is_err());
    }

    #[test]
    fn parses_a_cold_program() {
        let text = "def main $z\n    let $x 7\n    ret $x\n";
        let program = parse_cold_file("t.cold", text).unwrap();
        assert_eq!(program.name, "main");
        assert_eq!(program.param_names, vec!["z"]);
        assert_eq!(program.instructions.len(), 2);
    }
}
