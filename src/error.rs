use thiserror::Error;

/// Top-level error type for the HLO instruction layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", format_error_pretty("instruction error", &format!("{}", _0)))]
    Instr(#[from] InstrError),

    #[error("{}", format_error_pretty("proto error", &format!("{}", _0)))]
    Proto(#[from] ProtoError),

    #[error("{}", format_error_pretty("pass error", &format!("{}", _0)))]
    Pass(#[from] PassError),
}

/// Formats an error in a human-friendly style.
fn format_error_pretty(category: &str, msg: &str) -> String {
    format!("[{}] {}", category, msg)
}

// ---------------------------------------------------------------------------
// Instruction errors
// ---------------------------------------------------------------------------

/// Errors raised while constructing, cloning or querying an instruction.
///
/// Every error is a caller contract violation. Nothing here is transient and
/// nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstrError {
    #[error("invalid argument for '{opcode}': {detail}")]
    InvalidArgument { opcode: String, detail: String },

    #[error("'{opcode}' does not support {operation}")]
    Unsupported { opcode: String, operation: String },
}

impl InstrError {
    pub(crate) fn invalid(opcode: impl ToString, detail: impl Into<String>) -> Self {
        InstrError::InvalidArgument {
            opcode: opcode.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn unsupported(opcode: impl ToString, operation: impl Into<String>) -> Self {
        InstrError::Unsupported {
            opcode: opcode.to_string(),
            operation: operation.into(),
        }
    }

    /// Returns `true` for `InvalidArgument`.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, InstrError::InvalidArgument { .. })
    }

    /// Returns `true` for `Unsupported`.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, InstrError::Unsupported { .. })
    }
}

// ---------------------------------------------------------------------------
// Proto errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("unsupported proto version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("unknown opcode '{name}'")]
    UnknownOpcode { name: String },

    #[error("unknown fft type '{name}'")]
    UnknownFftType { name: String },

    #[error("unknown element type '{name}'")]
    UnknownElementType { name: String },

    #[error("in computation '{computation}': operand id {id} does not refer to an earlier instruction")]
    DanglingOperand { computation: String, id: u32 },

    #[error("computation id {id} is not defined before its first use")]
    DanglingComputation { id: u32 },

    #[error("'{opcode}' record is missing field '{field}'")]
    MissingField { opcode: String, field: &'static str },

    #[error("computation '{computation}' has no instructions")]
    EmptyComputation { computation: String },

    #[error(transparent)]
    Instr(#[from] InstrError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Pass errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PassError {
    #[error("channel {channel_id}: {detail}")]
    Channel { channel_id: i64, detail: String },

    #[error("in computation '{computation}': instruction '{instr}' uses operand id {operand} which is not defined before it")]
    OperandOrder {
        computation: String,
        instr: String,
        operand: u32,
    },

    #[error("in computation '{computation}': instruction '{instr}' calls computation id {callee} which does not exist")]
    MissingCallee {
        computation: String,
        instr: String,
        callee: u32,
    },

    #[error("in computation '{computation}': parameter number {number} is used more than once")]
    DuplicateParameter { computation: String, number: i64 },
}

// ---------------------------------------------------------------------------
// Diagnostic codes
// ---------------------------------------------------------------------------

impl Error {
    /// Returns a stable diagnostic code string for this error.
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            Error::Instr(i) => match i {
                InstrError::InvalidArgument { .. } => "E0001",
                InstrError::Unsupported { .. } => "E0002",
            },
            Error::Proto(p) => match p {
                ProtoError::Version { .. } => "E0100",
                ProtoError::UnknownOpcode { .. } => "E0101",
                ProtoError::UnknownFftType { .. } => "E0102",
                ProtoError::UnknownElementType { .. } => "E0103",
                ProtoError::DanglingOperand { .. } => "E0104",
                ProtoError::DanglingComputation { .. } => "E0105",
                ProtoError::MissingField { .. } => "E0106",
                ProtoError::EmptyComputation { .. } => "E0107",
                ProtoError::Instr(_) => "E0108",
                ProtoError::Json(_) => "E0109",
            },
            Error::Pass(p) => match p {
                PassError::Channel { .. } => "E0200",
                PassError::OperandOrder { .. } => "E0201",
                PassError::MissingCallee { .. } => "E0202",
                PassError::DuplicateParameter { .. } => "E0203",
            },
        }
    }
}
