use crate::error::InstrError;
use crate::ir::instr::{HloInstruction, InstrKind};
use crate::ir::opcode::HloOpcode;
use crate::ir::types::{PrimitiveType, Shape};

/// Whether `value` is exactly representable as an element of `ty`.
/// Floating-point and complex types take any value, NaN included.
fn can_hold(ty: PrimitiveType, value: f64) -> bool {
    let integral = value.is_finite() && value.fract() == 0.0;
    match ty {
        PrimitiveType::Pred => value == 0.0 || value == 1.0,
        PrimitiveType::S32 => integral && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&value),
        PrimitiveType::U32 => integral && (0.0..=f64::from(u32::MAX)).contains(&value),
        // i64::MAX rounds up to 2^63 as an f64
        PrimitiveType::S64 => integral && value >= i64::MIN as f64 && value < i64::MAX as f64,
        PrimitiveType::F16
        | PrimitiveType::F32
        | PrimitiveType::F64
        | PrimitiveType::C64
        | PrimitiveType::C128 => true,
    }
}

impl HloInstruction {
    /// Creates the `number`-th parameter of a computation.
    pub fn create_parameter(number: i64, shape: Shape) -> Result<Self, InstrError> {
        if number < 0 {
            return Err(InstrError::invalid(
                HloOpcode::Parameter,
                format!("parameter number must be non-negative, got {}", number),
            ));
        }
        HloInstruction::assemble(shape, &[], InstrKind::Parameter { number })
    }

    /// Creates a scalar constant of `element_type`.
    pub fn create_constant(value: f64, element_type: PrimitiveType) -> Result<Self, InstrError> {
        HloInstruction::create_constant_with_shape(value, &Shape::scalar(element_type))
    }

    pub(crate) fn create_constant_with_shape(value: f64, shape: &Shape) -> Result<Self, InstrError> {
        if !shape.is_scalar() {
            return Err(InstrError::invalid(
                HloOpcode::Constant,
                format!("constants are scalars, got shape {}", shape),
            ));
        }
        if let Some(element_type) = shape.element_type() {
            if !can_hold(element_type, value) {
                return Err(InstrError::invalid(
                    HloOpcode::Constant,
                    format!("{} cannot hold the value {}", element_type, value),
                ));
            }
        }
        HloInstruction::assemble(shape.clone(), &[], InstrKind::Constant { value })
    }

    /// Creates one of the elementwise binary instructions.
    ///
    /// Both operands and the result must be arrays with identical
    /// dimensions.
    pub fn create_binary(
        opcode: HloOpcode,
        shape: Shape,
        lhs: &HloInstruction,
        rhs: &HloInstruction,
    ) -> Result<Self, InstrError> {
        let kind = match opcode {
            HloOpcode::Add => InstrKind::Add,
            HloOpcode::Multiply => InstrKind::Multiply,
            HloOpcode::Maximum => InstrKind::Maximum,
            HloOpcode::Minimum => InstrKind::Minimum,
            other => {
                return Err(InstrError::invalid(other, "not an elementwise binary opcode"));
            }
        };
        for (role, operand) in [("lhs", lhs), ("rhs", rhs)] {
            if !operand.shape().is_array() || operand.shape().dims() != shape.dims() {
                return Err(InstrError::invalid(
                    opcode,
                    format!(
                        "{} shape {} does not match result shape {}",
                        role,
                        operand.shape(),
                        shape
                    ),
                ));
            }
        }
        HloInstruction::assemble(shape, &[lhs, rhs], kind)
    }

    pub fn parameter_number(&self) -> Result<i64, InstrError> {
        match self.kind {
            InstrKind::Parameter { number } => Ok(number),
            _ => Err(InstrError::unsupported(self.opcode(), "parameter_number")),
        }
    }

    pub fn constant_value(&self) -> Result<f64, InstrError> {
        match self.kind {
            InstrKind::Constant { value } => Ok(value),
            _ => Err(InstrError::unsupported(self.opcode(), "constant_value")),
        }
    }
}
