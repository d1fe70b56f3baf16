use std::fmt::Write as _;

use crate::instruction::Instruction;

/// Render a combination's instructions (or a validated solution) as `.cold`
/// source: `def main $arg1 $arg2 …` followed by one four-space-indented
/// instruction per line, matching the source's `fprint_program` exactly.
pub fn emit_program(input_names: &[String], instructions: &[Instruction]) -> String {
    let mut out = String::new();
    write!(out, "def main").unwrap();
    for name in input_names {
        write!(out, " ${name}").unwrap();
    }
    out.push('\n');
    for inst in instructions {
        writeln!(out, "    {inst}").unwrap();
    }
    out
}

/// One entry in the generated-programs log: every branch the search visited,
/// whether or not it solved, for the optional `--output-all` trace.
pub fn emit_generated_entry(index: u64, input_names: &[String], instructions: &[Instruction]) -> String {
    let mut out = String::new();
    writeln!(out, "# combination {index}").unwrap();
    out.push_str(&emit_program(input_names, instructions));
    out
}

/// Highlight a `.cold` program for TTY output: the `def` header in bold
/// green, instruction lines in cyan. Falls back to plain text automatically
/// when `colored` detects no color support (piped output, `NO_COLOR`, …).
pub fn colorize(text: &str) -> String {
    use colored::Colorize;
    text.lines()
        .map(|line| {
            if let Some(rest) = line.strip_prefix("def ") {
                format!("{} {}", "def".green().bold(), rest)
            } else {
                line.cyan().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
