use std::path::Path;
use std::sync::Arc;

use crate::errors::{ColdError, IoContextError};
use crate::pattern::Pattern;
use crate::text;
use crate::value::Value;

/// One (inputs, expected-output) test case.
#[derive(Debug, Clone)]
pub struct Case {
    pub inputs: Vec<Value>,
    pub expected: Value,
}

/// Everything a combination's search needs, shared read-only across workers.
/// Cheap to clone: every collection is behind an `Arc`, so cloning a
/// `Context` for a new worker is O(1) regardless of pattern library size,
/// matching SPEC_FULL.md §5's "no lock required" shared-state model.
#[derive(Debug, Clone)]
pub struct Context {
    pub input_names: Arc<Vec<String>>,
    pub cases: Arc<Vec<Case>>,
    pub patterns: Arc<Vec<Pattern>>,
    pub constants: Arc<Vec<Value>>,
    pub precision: Value,
    pub depth: usize,
}

impl Context {
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn combination_count(&self) -> u64 {
        (self.pattern_count() as u64).saturating_pow(self.depth as u32)
    }

    /// Parse a `.solve` file at `solver_path` and load every `pattern`
    /// directive from `patterns/<name>.pattern`, sibling to the solver file —
    /// mirroring `add_pattern`'s `patterns/<name>.pattern` convention in the
    /// original implementation.
    pub fn load(solver_path: &Path) -> Result<Context, ColdError> {
        let solver_file = solver_path.display().to_string();
        let text = std::fs::read_to_string(solver_path)
            .map_err(|e| IoContextError::new(solver_file.clone(), e))?;
        let parsed = text::parse_solver_file(&solver_file, &text)?;

        let patterns_dir = solver_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("patterns");

        let mut patterns = Vec::with_capacity(parsed.pattern_names.len());
        for name in &parsed.pattern_names {
            let path = patterns_dir.join(format!("{name}.pattern"));
            let path_str = path.display().to_string();
            let pattern_text = std::fs::read_to_string(&path)
                .map_err(|e| IoContextError::new(path_str.clone(), e))?;
            patterns.push(text::parse_pattern_file(name, &path_str, &pattern_text)?);
        }

        let precision = parsed.precision.unwrap_or(Value::Float(0.0));
        let depth = parsed.depth.unwrap_or(3);

        Ok(Context {
            input_names: Arc::new(parsed.input_names),
            cases: Arc::new(parsed.cases),
            patterns: Arc::new(patterns),
            constants: Arc::new(parsed.constants),
            precision,
            depth,
        })
    }
}

/// Runtime tuning resolved CLI flag > `COLD_*` env var > built-in default,
/// per SPEC_FULL.md §10.3. Assembled once in `main` and threaded through, not
/// a global/lazy-static — `cold` is a single run-then-exit invocation with no
/// notion of a persistent session.
#[derive(Debug, Clone)]
pub struct Settings {
    pub threads: usize,
    pub output_dir: std::path::PathBuf,
    pub print_solutions: bool,
    pub find_all: bool,
    pub interactive: bool,
    pub generated_log: bool,
    pub combination_start: u64,
    pub combination_count: Option<u64>,
}

impl Settings {
    pub fn resolve_threads(flag: Option<usize>) -> usize {
        if let Some(n) = flag {
            return n.max(1);
        }
        if let Ok(env) = std::env::var("COLD_THREADS") {
            if let Ok(n) = env.parse::<usize>() {
                return n.max(1);
            }
        }
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }
}
