/// Discriminant of an instruction.
///
/// The opcode is derived from the instruction's payload and is never stored
/// separately, so the two can not disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HloOpcode {
    // ---- Leaves ----
    Parameter,
    Constant,

    // ---- Elementwise binary ----
    Add,
    Multiply,
    Maximum,
    Minimum,

    // ---- Normalization ----
    BatchNormTraining,
    BatchNormInference,
    BatchNormGrad,

    // ---- Communication ----
    Send,
    SendDone,
    Recv,
    RecvDone,

    // ---- Structural / layout ----
    Reverse,
    Concatenate,
    Transpose,
    Broadcast,
    Slice,

    // ---- Reduction / mapping ----
    Reduce,
    Map,

    // ---- Signal processing ----
    Fft,
}

impl HloOpcode {
    pub const ALL: [HloOpcode; 21] = [
        HloOpcode::Parameter,
        HloOpcode::Constant,
        HloOpcode::Add,
        HloOpcode::Multiply,
        HloOpcode::Maximum,
        HloOpcode::Minimum,
        HloOpcode::BatchNormTraining,
        HloOpcode::BatchNormInference,
        HloOpcode::BatchNormGrad,
        HloOpcode::Send,
        HloOpcode::SendDone,
        HloOpcode::Recv,
        HloOpcode::RecvDone,
        HloOpcode::Reverse,
        HloOpcode::Concatenate,
        HloOpcode::Transpose,
        HloOpcode::Broadcast,
        HloOpcode::Slice,
        HloOpcode::Reduce,
        HloOpcode::Map,
        HloOpcode::Fft,
    ];

    /// Canonical lowercase name used by the text format and the proto records.
    pub fn name(self) -> &'static str {
        match self {
            HloOpcode::Parameter => "parameter",
            HloOpcode::Constant => "constant",
            HloOpcode::Add => "add",
            HloOpcode::Multiply => "multiply",
            HloOpcode::Maximum => "maximum",
            HloOpcode::Minimum => "minimum",
            HloOpcode::BatchNormTraining => "batch-norm-training",
            HloOpcode::BatchNormInference => "batch-norm-inference",
            HloOpcode::BatchNormGrad => "batch-norm-grad",
            HloOpcode::Send => "send",
            HloOpcode::SendDone => "send-done",
            HloOpcode::Recv => "recv",
            HloOpcode::RecvDone => "recv-done",
            HloOpcode::Reverse => "reverse",
            HloOpcode::Concatenate => "concatenate",
            HloOpcode::Transpose => "transpose",
            HloOpcode::Broadcast => "broadcast",
            HloOpcode::Slice => "slice",
            HloOpcode::Reduce => "reduce",
            HloOpcode::Map => "map",
            HloOpcode::Fft => "fft",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        HloOpcode::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Operand count fixed by the opcode, or `None` for variadic opcodes.
    pub fn arity(self) -> Option<usize> {
        match self {
            HloOpcode::Parameter | HloOpcode::Constant | HloOpcode::Recv => Some(0),
            HloOpcode::Send
            | HloOpcode::SendDone
            | HloOpcode::RecvDone
            | HloOpcode::Reverse
            | HloOpcode::Transpose
            | HloOpcode::Broadcast
            | HloOpcode::Slice
            | HloOpcode::Fft => Some(1),
            HloOpcode::Add
            | HloOpcode::Multiply
            | HloOpcode::Maximum
            | HloOpcode::Minimum
            | HloOpcode::Reduce => Some(2),
            HloOpcode::BatchNormTraining => Some(3),
            HloOpcode::BatchNormInference | HloOpcode::BatchNormGrad => Some(5),
            HloOpcode::Concatenate | HloOpcode::Map => None,
        }
    }
}

impl std::fmt::Display for HloOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
