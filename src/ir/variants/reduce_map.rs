//! Reduce and Map: instructions that embed a sub-computation.
//!
//! The sub-computation is referenced by `ComputationId` and may be shared by
//! any number of instructions. Equality of two embedded computations is
//! never decided here; it is delegated to the caller's oracle.

use crate::error::InstrError;
use crate::ir::computation::ComputationId;
use crate::ir::instr::{dimensions_attribute, EqComputations, HloInstruction, InstrId, InstrKind};
use crate::ir::opcode::HloOpcode;
use crate::ir::types::Shape;

#[derive(Debug, Clone, PartialEq)]
pub struct ReduceAttrs {
    /// Axes of the argument that are reduced away.
    pub(crate) dimensions: Vec<i64>,
    pub(crate) to_apply: ComputationId,
}

impl ReduceAttrs {
    pub(crate) fn identical(&self, other: &ReduceAttrs, eq_computations: EqComputations<'_>) -> bool {
        self.dimensions == other.dimensions && eq_computations(self.to_apply, other.to_apply)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapAttrs {
    /// Always `0..rank` of the result.
    pub(crate) dimensions: Vec<i64>,
    pub(crate) to_apply: ComputationId,
    /// Constant inputs to `to_apply`. They are not operands and are not
    /// rewired when the instruction is cloned.
    pub(crate) static_operands: Vec<InstrId>,
}

impl MapAttrs {
    pub(crate) fn extra_attributes(&self) -> Vec<String> {
        self.attributes_with(|id| id.to_string())
    }

    /// Renders the attributes with each static operand spelled by `name`.
    pub(crate) fn attributes_with(&self, name: impl Fn(InstrId) -> String) -> Vec<String> {
        let mut attrs = vec![dimensions_attribute(&self.dimensions)];
        if !self.static_operands.is_empty() {
            let names: Vec<String> = self.static_operands.iter().map(|id| name(*id)).collect();
            attrs.push(format!("static_operands={{{}}}", names.join(",")));
        }
        attrs
    }

    pub(crate) fn identical(&self, other: &MapAttrs, eq_computations: EqComputations<'_>) -> bool {
        self.dimensions == other.dimensions
            && self.static_operands == other.static_operands
            && eq_computations(self.to_apply, other.to_apply)
    }
}

impl HloInstruction {
    /// Reduces `arg` along `dimensions` with `to_apply`, starting from the
    /// scalar `init_value`.
    pub fn create_reduce(
        shape: Shape,
        arg: &HloInstruction,
        init_value: &HloInstruction,
        dimensions: &[i64],
        to_apply: ComputationId,
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Reduce;
        if !arg.shape().is_array() {
            return Err(InstrError::invalid(
                opcode,
                format!("argument must be an array, got {}", arg.shape()),
            ));
        }
        if !init_value.shape().is_scalar() {
            return Err(InstrError::invalid(
                opcode,
                format!("init value must be a scalar, got {}", init_value.shape()),
            ));
        }
        let rank = arg.shape().rank();
        let mut reduced = vec![false; rank];
        for &d in dimensions {
            if d < 0 || d as usize >= rank {
                return Err(InstrError::invalid(
                    opcode,
                    format!("dimension {} out of range for rank {}", d, rank),
                ));
            }
            if reduced[d as usize] {
                return Err(InstrError::invalid(
                    opcode,
                    format!("dimension {} is listed more than once", d),
                ));
            }
            reduced[d as usize] = true;
        }
        let kept: Vec<i64> = arg
            .shape()
            .dims()
            .iter()
            .zip(&reduced)
            .filter(|(_, r)| !**r)
            .map(|(size, _)| *size)
            .collect();
        if !shape.is_array() || shape.dims() != kept.as_slice() {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "result shape {} does not match argument {} with dimensions reduced",
                    shape,
                    arg.shape()
                ),
            ));
        }
        HloInstruction::assemble(
            shape,
            &[arg, init_value],
            InstrKind::Reduce(ReduceAttrs {
                dimensions: dimensions.to_vec(),
                to_apply,
            }),
        )
    }

    /// Applies `to_apply` elementwise across `operands`.
    pub fn create_map(
        shape: Shape,
        operands: &[&HloInstruction],
        to_apply: ComputationId,
    ) -> Result<Self, InstrError> {
        HloInstruction::create_map_with_static_operands(shape, operands, to_apply, &[])
    }

    /// Like `create_map`, with extra constant inputs passed to `to_apply`
    /// outside the operand list.
    pub fn create_map_with_static_operands(
        shape: Shape,
        operands: &[&HloInstruction],
        to_apply: ComputationId,
        static_operands: &[&HloInstruction],
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Map;
        if operands.is_empty() {
            return Err(InstrError::invalid(opcode, "at least one operand is required"));
        }
        if !shape.is_array() {
            return Err(InstrError::invalid(
                opcode,
                format!("result must be an array, got {}", shape),
            ));
        }
        for operand in operands {
            if operand.shape().dims() != shape.dims() || !operand.shape().is_array() {
                return Err(InstrError::invalid(
                    opcode,
                    format!(
                        "operand shape {} does not match result dimensions of {}",
                        operand.shape(),
                        shape
                    ),
                ));
            }
        }
        let static_operands = static_operands
            .iter()
            .map(|op| {
                op.id().ok_or_else(|| {
                    InstrError::invalid(
                        opcode,
                        format!("static operand '{}' has not been added to a computation", op.name()),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let dimensions = (0..shape.rank() as i64).collect();
        HloInstruction::assemble(
            shape,
            operands,
            InstrKind::Map(MapAttrs {
                dimensions,
                to_apply,
                static_operands,
            }),
        )
    }

    /// Constant inputs of a Map.
    pub fn static_operands(&self) -> Result<&[InstrId], InstrError> {
        match &self.kind {
            InstrKind::Map(attrs) => Ok(&attrs.static_operands),
            _ => Err(InstrError::unsupported(self.opcode(), "static_operands")),
        }
    }
}
