use thiserror::Error;

/// A malformed `.solve`, `.pattern`, or `.cold` file.
#[derive(Debug, Clone, Error)]
#[error("{file}:{line}: {message} (in `{text}`)")]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub text: String,
    pub message: String,
}

impl ParseError {
    pub fn new(file: impl Into<String>, line: usize, text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            text: text.into(),
            message: message.into(),
        }
    }
}

/// Failure to advance a [`crate::state::State`] by one instruction.
///
/// During search a `Dead` [`crate::interpreter::StepOutcome`] is produced instead of
/// propagating one of these as an error, so the candidate is silently pruned. `cold run`
/// has no search to prune into, so it surfaces these directly.
#[derive(Debug, Clone, Error)]
pub enum InterpretError {
    #[error("local `{0}` is not defined")]
    UndefinedLocal(String),

    #[error("instruction `{op}` cannot operate on these types: {detail}")]
    TypeMismatch { op: &'static str, detail: String },

    #[error("integer division by zero")]
    DivisionByZero,

    #[error("`cmp` requires integer operands")]
    NonIntegerCompare,

    #[error("an unresolved wildcard reached the interpreter")]
    UnresolvedWildcard,

    #[error("precision `{precision_tag}` does not match operand tag `{value_tag}`")]
    PrecisionTagMismatch {
        precision_tag: &'static str,
        value_tag: &'static str,
    },
}

#[derive(Debug, Error)]
#[error("{path}: {source}")]
pub struct IoContextError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

impl IoContextError {
    pub fn new(path: impl Into<String>, source: std::io::Error) -> Self {
        Self { path: path.into(), source }
    }
}

/// Top-level error returned by library entry points; `main` renders this at the
/// CLI boundary via `miette`.
#[derive(Debug, Error)]
pub enum ColdError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),

    #[error(transparent)]
    Io(#[from] IoContextError),

    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(std::io::Error),

    #[error("{0}")]
    Usage(String),
}

impl ColdError {
    /// Exit code conventions documented in SPEC_FULL.md §6.
    pub fn exit_code(&self) -> i32 {
        match self {
            ColdError::Usage(_) => 1,
            ColdError::Parse(_) => 2,
            ColdError::Interpret(_) => 3,
            ColdError::Io(_) => 4,
            ColdError::ThreadSpawn(_) => 5,
        }
    }
}
