/// Failures raised while turning source text into a word stream.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: unrecognized input `{text}`")]
    Lex { line: usize, text: String },
    #[error("line {line}: unexpected `{text}`")]
    Parse { line: usize, text: String },
    #[error("line {line}: operand `{text}` is not valid in this position")]
    InvalidOperand { line: usize, text: String },
    #[error("undefined symbol `{name}`")]
    UndefinedSymbol { name: String },
    #[error("label `{name}` defined more than once")]
    DuplicateLabel { name: String },
}

pub type Result<T, E = AsmError> = std::result::Result<T, E>;
