//! Batch normalization: training, inference and gradient.
//!
//! All three share `epsilon` (added to the variance to avoid division by
//! zero) and `feature_index` (the axis of the operand that holds features).
//! Operand roles and result shapes are fixed by opcode. `f` is the operand
//! shape restricted to the feature dimension, `element[features]`:
//!
//! ```text
//! training   operand, scale, offset                          -> (operand, f, f)
//! inference  operand, scale, offset, mean, variance          -> operand
//! grad       operand, scale, mean, variance, grad_output     -> (operand, f, f)
//! ```
//!
//! Every per-feature operand has shape `f`; `grad_output` has the operand's
//! shape.

use crate::error::InstrError;
use crate::ir::instr::{HloInstruction, InstrKind};
use crate::ir::opcode::HloOpcode;
use crate::ir::types::Shape;

#[derive(Debug, Clone, PartialEq)]
pub struct BatchNormAttrs {
    pub(crate) epsilon: f32,
    pub(crate) feature_index: i64,
}

impl BatchNormAttrs {
    /// Validates the attributes against `operand` and `scale` and returns
    /// them with the shape of one per-feature vector, `element[features]`.
    fn new(
        opcode: HloOpcode,
        operand: &HloInstruction,
        scale: &HloInstruction,
        epsilon: f32,
        feature_index: i64,
    ) -> Result<(Self, Shape), InstrError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(InstrError::invalid(
                opcode,
                format!("epsilon must be finite and non-negative, got {}", epsilon),
            ));
        }
        let shape = operand.shape();
        let element_type = shape.element_type().ok_or_else(|| {
            InstrError::invalid(opcode, format!("operand must be an array, got {}", shape))
        })?;
        let rank = shape.rank();
        if feature_index < 0 || feature_index as usize >= rank {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "feature_index {} out of range for rank-{} operand",
                    feature_index, rank
                ),
            ));
        }
        let features = Shape::array(element_type, vec![shape.dims()[feature_index as usize]]);
        expect_shape(opcode, "scale", scale.shape(), &features)?;
        Ok((
            Self {
                epsilon,
                feature_index,
            },
            features,
        ))
    }

    pub(crate) fn extra_attributes(&self) -> Vec<String> {
        vec![
            format!("epsilon={}", self.epsilon),
            format!("feature_index={}", self.feature_index),
        ]
    }

    pub(crate) fn identical(&self, other: &BatchNormAttrs) -> bool {
        self.epsilon == other.epsilon && self.feature_index == other.feature_index
    }
}

fn expect_shape(opcode: HloOpcode, role: &str, got: &Shape, expected: &Shape) -> Result<(), InstrError> {
    if got != expected {
        return Err(InstrError::invalid(
            opcode,
            format!("{} shape {} does not match expected {}", role, got, expected),
        ));
    }
    Ok(())
}

/// `(operand, features, features)`: the normalized or gradient array plus
/// two per-feature vectors.
fn output_tuple(operand: &HloInstruction, features: &Shape) -> Shape {
    Shape::tuple(vec![operand.shape().clone(), features.clone(), features.clone()])
}

impl HloInstruction {
    pub fn create_batch_norm_training(
        shape: Shape,
        operand: &HloInstruction,
        scale: &HloInstruction,
        offset: &HloInstruction,
        epsilon: f32,
        feature_index: i64,
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::BatchNormTraining;
        let (attrs, features) = BatchNormAttrs::new(opcode, operand, scale, epsilon, feature_index)?;
        expect_shape(opcode, "offset", offset.shape(), &features)?;
        expect_shape(opcode, "result", &shape, &output_tuple(operand, &features))?;
        HloInstruction::assemble(
            shape,
            &[operand, scale, offset],
            InstrKind::BatchNormTraining(attrs),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_batch_norm_inference(
        shape: Shape,
        operand: &HloInstruction,
        scale: &HloInstruction,
        offset: &HloInstruction,
        mean: &HloInstruction,
        variance: &HloInstruction,
        epsilon: f32,
        feature_index: i64,
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::BatchNormInference;
        let (attrs, features) = BatchNormAttrs::new(opcode, operand, scale, epsilon, feature_index)?;
        for (role, instr) in [("offset", offset), ("mean", mean), ("variance", variance)] {
            expect_shape(opcode, role, instr.shape(), &features)?;
        }
        expect_shape(opcode, "result", &shape, operand.shape())?;
        HloInstruction::assemble(
            shape,
            &[operand, scale, offset, mean, variance],
            InstrKind::BatchNormInference(attrs),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_batch_norm_grad(
        shape: Shape,
        operand: &HloInstruction,
        scale: &HloInstruction,
        mean: &HloInstruction,
        variance: &HloInstruction,
        grad_output: &HloInstruction,
        epsilon: f32,
        feature_index: i64,
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::BatchNormGrad;
        let (attrs, features) = BatchNormAttrs::new(opcode, operand, scale, epsilon, feature_index)?;
        for (role, instr) in [("mean", mean), ("variance", variance)] {
            expect_shape(opcode, role, instr.shape(), &features)?;
        }
        expect_shape(opcode, "grad_output", grad_output.shape(), operand.shape())?;
        expect_shape(opcode, "result", &shape, &output_tuple(operand, &features))?;
        HloInstruction::assemble(
            shape,
            &[operand, scale, mean, variance, grad_output],
            InstrKind::BatchNormGrad(attrs),
        )
    }

    fn batch_norm_attrs(&self) -> Option<&BatchNormAttrs> {
        match &self.kind {
            InstrKind::BatchNormTraining(attrs)
            | InstrKind::BatchNormInference(attrs)
            | InstrKind::BatchNormGrad(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Small value added to the variance to avoid dividing by zero.
    pub fn epsilon(&self) -> Result<f32, InstrError> {
        self.batch_norm_attrs()
            .map(|a| a.epsilon)
            .ok_or_else(|| InstrError::unsupported(self.opcode(), "epsilon"))
    }

    /// Index of the feature dimension of the operand.
    pub fn feature_index(&self) -> Result<i64, InstrError> {
        self.batch_norm_attrs()
            .map(|a| a.feature_index)
            .ok_or_else(|| InstrError::unsupported(self.opcode(), "feature_index"))
    }
}
