//! Structural / layout instructions: Reverse, Concatenate, Transpose,
//! Broadcast and Slice.
//!
//! Constructors check axis attributes against the operand shapes and the
//! declared result shape. They do not infer the result shape.

use std::collections::HashSet;

use crate::error::InstrError;
use crate::ir::instr::{join_i64, HloInstruction, InstrKind};
use crate::ir::opcode::HloOpcode;
use crate::ir::types::{slice_dim_size, Shape};

/// Index ranges of a slice, one `[start, limit)` with stride per operand
/// dimension, plus the backend's in-place marker.
#[derive(Debug, Clone)]
pub struct SliceAttrs {
    pub(crate) starts: Vec<i64>,
    pub(crate) limits: Vec<i64>,
    pub(crate) strides: Vec<i64>,
    /// Set by buffer assignment when the slice can be lowered as a view into
    /// its operand. Not part of the instruction's identity.
    pub(crate) is_in_place: bool,
}

impl SliceAttrs {
    pub(crate) fn extra_attributes(&self) -> Vec<String> {
        let ranges: Vec<String> = (0..self.starts.len())
            .map(|d| {
                if self.strides[d] == 1 {
                    format!("[{}:{}]", self.starts[d], self.limits[d])
                } else {
                    format!("[{}:{}:{}]", self.starts[d], self.limits[d], self.strides[d])
                }
            })
            .collect();
        vec![format!("slice={{{}}}", ranges.join(", "))]
    }

    pub(crate) fn identical(&self, other: &SliceAttrs) -> bool {
        self.starts == other.starts && self.limits == other.limits && self.strides == other.strides
    }
}

fn require_array(opcode: HloOpcode, role: &str, shape: &Shape) -> Result<(), InstrError> {
    if !shape.is_array() {
        return Err(InstrError::invalid(
            opcode,
            format!("{} must be an array, got {}", role, shape),
        ));
    }
    Ok(())
}

fn require_same_element_type(opcode: HloOpcode, shape: &Shape, operand: &Shape) -> Result<(), InstrError> {
    if shape.element_type() != operand.element_type() {
        return Err(InstrError::invalid(
            opcode,
            format!("result shape {} has a different element type than operand {}", shape, operand),
        ));
    }
    Ok(())
}

/// Checks that every axis is in `[0, rank)` and appears once.
fn check_axes(opcode: HloOpcode, axes: &[i64], rank: usize) -> Result<(), InstrError> {
    let mut seen = HashSet::new();
    for &axis in axes {
        if axis < 0 || axis as usize >= rank {
            return Err(InstrError::invalid(
                opcode,
                format!("dimension {} out of range for rank {}", axis, rank),
            ));
        }
        if !seen.insert(axis) {
            return Err(InstrError::invalid(
                opcode,
                format!("dimension {} is listed more than once", axis),
            ));
        }
    }
    Ok(())
}

impl HloInstruction {
    /// Reverses the order of elements along `dimensions`.
    pub fn create_reverse(
        shape: Shape,
        operand: &HloInstruction,
        dimensions: &[i64],
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Reverse;
        require_array(opcode, "operand", operand.shape())?;
        check_axes(opcode, dimensions, operand.shape().rank())?;
        if shape != *operand.shape() {
            return Err(InstrError::invalid(
                opcode,
                format!("result shape {} differs from operand shape {}", shape, operand.shape()),
            ));
        }
        HloInstruction::assemble(
            shape,
            &[operand],
            InstrKind::Reverse {
                dimensions: dimensions.to_vec(),
            },
        )
    }

    /// Concatenates `operands` along `dimension`.
    ///
    /// All operands must have the same element type and rank and agree on
    /// every other dimension. The result is the first operand's shape with
    /// `dimension` set to the sum of theirs.
    pub fn create_concatenate(
        shape: Shape,
        operands: &[&HloInstruction],
        dimension: i64,
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Concatenate;
        let first = operands
            .first()
            .ok_or_else(|| InstrError::invalid(opcode, "at least one operand is required"))?
            .shape();
        let element_type = first.element_type().ok_or_else(|| {
            InstrError::invalid(opcode, format!("operand must be an array, got {}", first))
        })?;
        let rank = first.rank();
        check_axes(opcode, &[dimension], rank)?;
        let axis = dimension as usize;
        let mut total = 0;
        for operand in operands {
            let operand_shape = operand.shape();
            require_array(opcode, "operand", operand_shape)?;
            let dims = operand_shape.dims();
            let agrees = operand_shape.element_type() == Some(element_type)
                && dims.len() == rank
                && (0..rank).all(|d| d == axis || dims[d] == first.dims()[d]);
            if !agrees {
                return Err(InstrError::invalid(
                    opcode,
                    format!(
                        "operand shape {} differs from {} outside dimension {}",
                        operand_shape, first, dimension
                    ),
                ));
            }
            total += dims[axis];
        }
        let mut dims = first.dims().to_vec();
        dims[axis] = total;
        let expected = Shape::array(element_type, dims);
        if shape != expected {
            return Err(InstrError::invalid(
                opcode,
                format!("result shape {} does not match concatenated shape {}", shape, expected),
            ));
        }
        HloInstruction::assemble(
            shape,
            operands,
            InstrKind::Concatenate {
                dimensions: vec![dimension],
            },
        )
    }

    /// Permutes the operand's dimensions: result dimension `i` is operand
    /// dimension `dimensions[i]`.
    pub fn create_transpose(
        shape: Shape,
        operand: &HloInstruction,
        dimensions: &[i64],
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Transpose;
        require_array(opcode, "operand", operand.shape())?;
        let in_dims = operand.shape().dims();
        if dimensions.len() != in_dims.len() {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "{} dimensions given for rank-{} operand",
                    dimensions.len(),
                    in_dims.len()
                ),
            ));
        }
        check_axes(opcode, dimensions, in_dims.len())?;
        require_same_element_type(opcode, &shape, operand.shape())?;
        let permuted: Vec<i64> = dimensions.iter().map(|&d| in_dims[d as usize]).collect();
        if shape.dims() != permuted.as_slice() {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "result shape {} is not operand shape {} permuted by {{{}}}",
                    shape,
                    operand.shape(),
                    join_i64(dimensions)
                ),
            ));
        }
        HloInstruction::assemble(
            shape,
            &[operand],
            InstrKind::Transpose {
                dimensions: dimensions.to_vec(),
            },
        )
    }

    /// Broadcasts the operand into `shape`: operand dimension `i` becomes
    /// result dimension `dimensions[i]`.
    pub fn create_broadcast(
        shape: Shape,
        operand: &HloInstruction,
        dimensions: &[i64],
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Broadcast;
        require_array(opcode, "operand", operand.shape())?;
        require_array(opcode, "result", &shape)?;
        let in_dims = operand.shape().dims();
        if dimensions.len() != in_dims.len() {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "{} dimensions given for rank-{} operand",
                    dimensions.len(),
                    in_dims.len()
                ),
            ));
        }
        check_axes(opcode, dimensions, shape.rank())?;
        require_same_element_type(opcode, &shape, operand.shape())?;
        for (i, &d) in dimensions.iter().enumerate() {
            if shape.dims()[d as usize] != in_dims[i] {
                return Err(InstrError::invalid(
                    opcode,
                    format!(
                        "operand dimension {} (size {}) does not match result dimension {} (size {})",
                        i,
                        in_dims[i],
                        d,
                        shape.dims()[d as usize]
                    ),
                ));
            }
        }
        HloInstruction::assemble(
            shape,
            &[operand],
            InstrKind::Broadcast {
                dimensions: dimensions.to_vec(),
            },
        )
    }

    /// Extracts `[starts[d], limits[d])` with `strides[d]` from every
    /// dimension of the operand.
    ///
    /// Requires `0 <= start < limit <= operand dim` and `stride >= 1` in every
    /// dimension, and a result of `ceil((limit - start) / stride)` elements
    /// per dimension.
    pub fn create_slice(
        shape: Shape,
        operand: &HloInstruction,
        starts: &[i64],
        limits: &[i64],
        strides: &[i64],
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Slice;
        require_array(opcode, "operand", operand.shape())?;
        let in_dims = operand.shape().dims();
        let rank = in_dims.len();
        if starts.len() != rank || limits.len() != rank || strides.len() != rank {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "expected {} starts/limits/strides, got {}/{}/{}",
                    rank,
                    starts.len(),
                    limits.len(),
                    strides.len()
                ),
            ));
        }
        for d in 0..rank {
            if strides[d] < 1 {
                return Err(InstrError::invalid(
                    opcode,
                    format!("stride {} in dimension {} is less than 1", strides[d], d),
                ));
            }
            if starts[d] < 0 || starts[d] >= limits[d] || limits[d] > in_dims[d] {
                return Err(InstrError::invalid(
                    opcode,
                    format!(
                        "range [{}:{}) in dimension {} is not within [0:{})",
                        starts[d], limits[d], d, in_dims[d]
                    ),
                ));
            }
        }
        let expected: Vec<i64> = (0..rank)
            .map(|d| slice_dim_size(starts[d], limits[d], strides[d]))
            .collect();
        if shape.element_type() != operand.shape().element_type() || shape.dims() != expected.as_slice() {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "result shape {} does not match sliced dimensions [{}]",
                    shape,
                    join_i64(&expected)
                ),
            ));
        }
        HloInstruction::assemble(
            shape,
            &[operand],
            InstrKind::Slice(SliceAttrs {
                starts: starts.to_vec(),
                limits: limits.to_vec(),
                strides: strides.to_vec(),
                is_in_place: false,
            }),
        )
    }

    /// The axis a Concatenate joins its operands along.
    pub fn concatenate_dimension(&self) -> Result<i64, InstrError> {
        match &self.kind {
            InstrKind::Concatenate { dimensions } => Ok(dimensions[0]),
            _ => Err(InstrError::unsupported(self.opcode(), "concatenate_dimension")),
        }
    }

    /// Returns `true` for a transpose that swaps the two axes of a rank-2
    /// array.
    pub fn is_rank2_transpose(&self) -> bool {
        matches!(&self.kind, InstrKind::Transpose { dimensions } if dimensions == &[1, 0])
    }

    fn slice_attrs(&self, operation: &str) -> Result<&SliceAttrs, InstrError> {
        match &self.kind {
            InstrKind::Slice(attrs) => Ok(attrs),
            _ => Err(InstrError::unsupported(self.opcode(), operation)),
        }
    }

    pub fn slice_starts(&self) -> Result<&[i64], InstrError> {
        Ok(&self.slice_attrs("slice_starts")?.starts)
    }

    /// Exclusive upper bounds.
    pub fn slice_limits(&self) -> Result<&[i64], InstrError> {
        Ok(&self.slice_attrs("slice_limits")?.limits)
    }

    pub fn slice_strides(&self) -> Result<&[i64], InstrError> {
        Ok(&self.slice_attrs("slice_strides")?.strides)
    }

    pub fn slice_starts_at(&self, dimension: usize) -> Result<i64, InstrError> {
        slice_entry(self, self.slice_starts()?, dimension)
    }

    pub fn slice_limits_at(&self, dimension: usize) -> Result<i64, InstrError> {
        slice_entry(self, self.slice_limits()?, dimension)
    }

    pub fn slice_strides_at(&self, dimension: usize) -> Result<i64, InstrError> {
        slice_entry(self, self.slice_strides()?, dimension)
    }

    pub fn is_in_place_slice(&self) -> Result<bool, InstrError> {
        Ok(self.slice_attrs("is_in_place_slice")?.is_in_place)
    }

    /// Records whether this slice can be lowered as a view into its operand.
    /// Returns the value that was set.
    ///
    /// This is the only mutation an instruction permits after construction.
    pub fn set_is_in_place_slice(&mut self, value: bool) -> Result<bool, InstrError> {
        let opcode = self.opcode();
        match &mut self.kind {
            InstrKind::Slice(attrs) => {
                attrs.is_in_place = value;
                Ok(value)
            }
            _ => Err(InstrError::unsupported(opcode, "set_is_in_place_slice")),
        }
    }
}

fn slice_entry(instr: &HloInstruction, values: &[i64], dimension: usize) -> Result<i64, InstrError> {
    values.get(dimension).copied().ok_or_else(|| {
        InstrError::invalid(
            instr.opcode(),
            format!("dimension {} out of range for rank {}", dimension, values.len()),
        )
    })
}
