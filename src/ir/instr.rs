use std::collections::HashMap;

use crate::error::{InstrError, ProtoError};
use crate::ir::clone_context::CloneContext;
use crate::ir::computation::ComputationId;
use crate::ir::opcode::HloOpcode;
use crate::ir::types::{FftType, Shape};
use crate::ir::variants::{BatchNormAttrs, ChannelAttrs, FftAttrs, MapAttrs, ReduceAttrs, SliceAttrs};
use crate::proto::{HloInstructionProto, ShapeProto, SliceDimensionProto};

/// Index of an instruction within its computation's instruction arena.
///
/// Invariant: `InstrId(n)` is only meaningful inside the `HloComputation`
/// that assigned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(pub u32);

impl std::fmt::Display for InstrId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Id written to the record of an instruction that was never added to a
/// computation.
pub const DETACHED_ID: u32 = u32::MAX;

/// Predicate deciding whether two sub-computations count as equal.
pub type EqComputations<'a> = &'a dyn Fn(ComputationId, ComputationId) -> bool;

/// Predicate deciding whether two operands count as equal.
pub type EqOperands<'a> = &'a dyn Fn(InstrId, InstrId) -> bool;

/// Opcode-specific payload. One variant per opcode.
#[derive(Debug, Clone)]
pub enum InstrKind {
    // ---- Leaves ----
    Parameter { number: i64 },
    Constant { value: f64 },

    // ---- Elementwise binary ----
    Add,
    Multiply,
    Maximum,
    Minimum,

    // ---- Normalization ----
    BatchNormTraining(BatchNormAttrs),
    BatchNormInference(BatchNormAttrs),
    BatchNormGrad(BatchNormAttrs),

    // ---- Communication ----
    Send(ChannelAttrs),
    SendDone(ChannelAttrs),
    Recv(ChannelAttrs),
    RecvDone(ChannelAttrs),

    // ---- Structural / layout ----
    /// Axes to reverse.
    Reverse { dimensions: Vec<i64> },
    /// Single-element: the concatenation axis.
    Concatenate { dimensions: Vec<i64> },
    /// Permutation: result dim `i` is operand dim `dimensions[i]`.
    Transpose { dimensions: Vec<i64> },
    /// Operand dim `i` maps to result dim `dimensions[i]`.
    Broadcast { dimensions: Vec<i64> },
    Slice(SliceAttrs),

    // ---- Reduction / mapping ----
    Reduce(ReduceAttrs),
    Map(MapAttrs),

    // ---- Signal processing ----
    Fft(FftAttrs),
}

impl InstrKind {
    pub fn opcode(&self) -> HloOpcode {
        match self {
            InstrKind::Parameter { .. } => HloOpcode::Parameter,
            InstrKind::Constant { .. } => HloOpcode::Constant,
            InstrKind::Add => HloOpcode::Add,
            InstrKind::Multiply => HloOpcode::Multiply,
            InstrKind::Maximum => HloOpcode::Maximum,
            InstrKind::Minimum => HloOpcode::Minimum,
            InstrKind::BatchNormTraining(_) => HloOpcode::BatchNormTraining,
            InstrKind::BatchNormInference(_) => HloOpcode::BatchNormInference,
            InstrKind::BatchNormGrad(_) => HloOpcode::BatchNormGrad,
            InstrKind::Send(_) => HloOpcode::Send,
            InstrKind::SendDone(_) => HloOpcode::SendDone,
            InstrKind::Recv(_) => HloOpcode::Recv,
            InstrKind::RecvDone(_) => HloOpcode::RecvDone,
            InstrKind::Reverse { .. } => HloOpcode::Reverse,
            InstrKind::Concatenate { .. } => HloOpcode::Concatenate,
            InstrKind::Transpose { .. } => HloOpcode::Transpose,
            InstrKind::Broadcast { .. } => HloOpcode::Broadcast,
            InstrKind::Slice(_) => HloOpcode::Slice,
            InstrKind::Reduce(_) => HloOpcode::Reduce,
            InstrKind::Map(_) => HloOpcode::Map,
            InstrKind::Fft(_) => HloOpcode::Fft,
        }
    }
}

/// A node of the dataflow graph.
///
/// An instruction is owned by exactly one `HloComputation`. Operands are
/// `InstrId`s into that computation's arena and always refer to instructions
/// added before this one. Instructions are never copied implicitly: the only
/// way to duplicate one is `clone_with_new_operands`.
///
/// Apart from the in-place marker on slices, an instruction is immutable once
/// constructed.
#[derive(Debug)]
pub struct HloInstruction {
    /// Assigned by `HloComputationBuilder::add_instruction`.
    pub(crate) id: Option<InstrId>,
    pub(crate) name: String,
    pub(crate) shape: Shape,
    pub(crate) operands: Vec<InstrId>,
    pub(crate) kind: InstrKind,
}

impl HloInstruction {
    /// Common constructor tail: resolves operand ids and assembles the node.
    ///
    /// Every operand must already belong to a computation.
    pub(crate) fn assemble(
        shape: Shape,
        operands: &[&HloInstruction],
        kind: InstrKind,
    ) -> Result<Self, InstrError> {
        let opcode = kind.opcode();
        let operands = operand_ids(opcode, operands)?;
        Ok(Self {
            id: None,
            name: String::new(),
            shape,
            operands,
            kind,
        })
    }

    /// Replaces the display name. An empty name is filled in by the builder.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // ---- Generic fields ----

    pub fn id(&self) -> Option<InstrId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opcode(&self) -> HloOpcode {
        self.kind.opcode()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> &InstrKind {
        &self.kind
    }

    pub fn operands(&self) -> &[InstrId] {
        &self.operands
    }

    pub fn operand(&self, index: usize) -> Option<InstrId> {
        self.operands.get(index).copied()
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    // ---- Generic attribute accessors ----

    /// Axis indices carried by Reverse, Concatenate, Transpose, Broadcast,
    /// Reduce and Map.
    pub fn dimensions(&self) -> Result<&[i64], InstrError> {
        match &self.kind {
            InstrKind::Reverse { dimensions }
            | InstrKind::Concatenate { dimensions }
            | InstrKind::Transpose { dimensions }
            | InstrKind::Broadcast { dimensions } => Ok(dimensions),
            InstrKind::Reduce(attrs) => Ok(&attrs.dimensions),
            InstrKind::Map(attrs) => Ok(&attrs.dimensions),
            _ => Err(InstrError::unsupported(self.opcode(), "dimensions")),
        }
    }

    pub fn dimensions_at(&self, index: usize) -> Result<i64, InstrError> {
        let dims = self.dimensions()?;
        dims.get(index).copied().ok_or_else(|| {
            InstrError::invalid(
                self.opcode(),
                format!("dimension index {} out of range for {} dimensions", index, dims.len()),
            )
        })
    }

    /// Sub-computations embedded by this instruction, in a fixed order.
    pub fn called_computations(&self) -> Vec<ComputationId> {
        match &self.kind {
            InstrKind::Reduce(attrs) => vec![attrs.to_apply],
            InstrKind::Map(attrs) => vec![attrs.to_apply],
            _ => Vec::new(),
        }
    }

    pub fn to_apply(&self) -> Result<ComputationId, InstrError> {
        match &self.kind {
            InstrKind::Reduce(attrs) => Ok(attrs.to_apply),
            InstrKind::Map(attrs) => Ok(attrs.to_apply),
            _ => Err(InstrError::unsupported(self.opcode(), "to_apply")),
        }
    }

    /// Returns `true` for instructions that apply the same scalar function to
    /// every element position of their operands.
    pub fn is_elementwise(&self) -> bool {
        matches!(
            self.kind,
            InstrKind::Add
                | InstrKind::Multiply
                | InstrKind::Maximum
                | InstrKind::Minimum
                | InstrKind::Map(_)
        )
    }

    // ---- Generic operations ----

    /// Renders this instruction's own attributes as `key=value` strings.
    ///
    /// Shared fields (name, shape, opcode, operands) and called computations
    /// are rendered by the printer, not here. Output is deterministic.
    pub fn extra_attributes_to_string(&self) -> Vec<String> {
        match &self.kind {
            InstrKind::Parameter { .. }
            | InstrKind::Constant { .. }
            | InstrKind::Add
            | InstrKind::Multiply
            | InstrKind::Maximum
            | InstrKind::Minimum => Vec::new(),
            InstrKind::BatchNormTraining(attrs)
            | InstrKind::BatchNormInference(attrs)
            | InstrKind::BatchNormGrad(attrs) => attrs.extra_attributes(),
            InstrKind::Send(attrs)
            | InstrKind::SendDone(attrs)
            | InstrKind::Recv(attrs)
            | InstrKind::RecvDone(attrs) => attrs.extra_attributes(),
            InstrKind::Reverse { dimensions }
            | InstrKind::Concatenate { dimensions }
            | InstrKind::Transpose { dimensions }
            | InstrKind::Broadcast { dimensions } => vec![dimensions_attribute(dimensions)],
            InstrKind::Slice(attrs) => attrs.extra_attributes(),
            InstrKind::Reduce(attrs) => vec![dimensions_attribute(&attrs.dimensions)],
            InstrKind::Map(attrs) => attrs.extra_attributes(),
            InstrKind::Fft(attrs) => attrs.extra_attributes(),
        }
    }

    /// Full structural comparison: opcode, shape, operands (through
    /// `eq_operands`) and finally the variant's own state.
    pub fn identical(
        &self,
        other: &HloInstruction,
        eq_operands: EqOperands<'_>,
        eq_computations: EqComputations<'_>,
    ) -> bool {
        if self.opcode() != other.opcode()
            || self.shape != other.shape
            || self.operands.len() != other.operands.len()
        {
            return false;
        }
        if !self
            .operands
            .iter()
            .zip(&other.operands)
            .all(|(a, b)| eq_operands(*a, *b))
        {
            return false;
        }
        self.identical_slow_path(other, eq_computations)
    }

    /// Compares only the opcode-specific state of two instructions.
    ///
    /// Callers are expected to have compared opcode, shape and operands
    /// already (see `identical`). Typed values are compared directly, never
    /// their rendered form. Embedded sub-computations go through
    /// `eq_computations`.
    pub fn identical_slow_path(
        &self,
        other: &HloInstruction,
        eq_computations: EqComputations<'_>,
    ) -> bool {
        match (&self.kind, &other.kind) {
            (InstrKind::Parameter { number: a }, InstrKind::Parameter { number: b }) => a == b,
            (InstrKind::Constant { value: a }, InstrKind::Constant { value: b }) => {
                a.to_bits() == b.to_bits()
            }
            (InstrKind::Add, InstrKind::Add)
            | (InstrKind::Multiply, InstrKind::Multiply)
            | (InstrKind::Maximum, InstrKind::Maximum)
            | (InstrKind::Minimum, InstrKind::Minimum) => true,
            (InstrKind::BatchNormTraining(a), InstrKind::BatchNormTraining(b))
            | (InstrKind::BatchNormInference(a), InstrKind::BatchNormInference(b))
            | (InstrKind::BatchNormGrad(a), InstrKind::BatchNormGrad(b)) => a.identical(b),
            (InstrKind::Send(a), InstrKind::Send(b))
            | (InstrKind::SendDone(a), InstrKind::SendDone(b))
            | (InstrKind::Recv(a), InstrKind::Recv(b))
            | (InstrKind::RecvDone(a), InstrKind::RecvDone(b)) => a.channel_id == b.channel_id,
            (InstrKind::Reverse { dimensions: a }, InstrKind::Reverse { dimensions: b })
            | (InstrKind::Concatenate { dimensions: a }, InstrKind::Concatenate { dimensions: b })
            | (InstrKind::Transpose { dimensions: a }, InstrKind::Transpose { dimensions: b })
            | (InstrKind::Broadcast { dimensions: a }, InstrKind::Broadcast { dimensions: b }) => {
                a == b
            }
            (InstrKind::Slice(a), InstrKind::Slice(b)) => a.identical(b),
            (InstrKind::Reduce(a), InstrKind::Reduce(b)) => a.identical(b, eq_computations),
            (InstrKind::Map(a), InstrKind::Map(b)) => a.identical(b, eq_computations),
            (InstrKind::Fft(a), InstrKind::Fft(b)) => a == b,
            _ => false,
        }
    }

    /// Builds a new instruction of the same variant with the same attributes,
    /// bound to `new_operands` and `shape`.
    ///
    /// Every variant runs its constructor again, so the new operands are
    /// validated exactly like the originals were. Sub-computations of
    /// Map/Reduce are resolved through `context` when one is given; without a
    /// context the clone references the same sub-computation. Send, SendDone
    /// and RecvDone derive their shape from the new operand; Recv takes its
    /// data shape from element 0 of `shape`.
    pub fn clone_with_new_operands(
        &self,
        shape: &Shape,
        new_operands: &[&HloInstruction],
        context: Option<&mut CloneContext<'_>>,
    ) -> Result<HloInstruction, InstrError> {
        let opcode = self.opcode();
        check_arity(opcode, self.operands.len(), new_operands.len())?;
        let ops = new_operands;

        let clone = match &self.kind {
            InstrKind::Parameter { number } => {
                HloInstruction::create_parameter(*number, shape.clone())?
            }
            InstrKind::Constant { value } => HloInstruction::create_constant_with_shape(*value, shape)?,
            InstrKind::Add | InstrKind::Multiply | InstrKind::Maximum | InstrKind::Minimum => {
                HloInstruction::create_binary(opcode, shape.clone(), ops[0], ops[1])?
            }
            InstrKind::BatchNormTraining(a) => HloInstruction::create_batch_norm_training(
                shape.clone(),
                ops[0],
                ops[1],
                ops[2],
                a.epsilon,
                a.feature_index,
            )?,
            InstrKind::BatchNormInference(a) => HloInstruction::create_batch_norm_inference(
                shape.clone(),
                ops[0],
                ops[1],
                ops[2],
                ops[3],
                ops[4],
                a.epsilon,
                a.feature_index,
            )?,
            InstrKind::BatchNormGrad(a) => HloInstruction::create_batch_norm_grad(
                shape.clone(),
                ops[0],
                ops[1],
                ops[2],
                ops[3],
                ops[4],
                a.epsilon,
                a.feature_index,
            )?,
            InstrKind::Send(a) => HloInstruction::create_send(ops[0], a.channel_id)?,
            InstrKind::SendDone(_) => HloInstruction::create_send_done(ops[0])?,
            InstrKind::Recv(a) => {
                let data = shape.tuple_element(0).ok_or_else(|| {
                    InstrError::invalid(opcode, format!("clone shape {} is not a (data, context) tuple", shape))
                })?;
                HloInstruction::create_recv(data.clone(), a.channel_id)?
            }
            InstrKind::RecvDone(_) => HloInstruction::create_recv_done(ops[0])?,
            InstrKind::Reverse { dimensions } => {
                HloInstruction::create_reverse(shape.clone(), ops[0], dimensions)?
            }
            InstrKind::Concatenate { dimensions } => {
                HloInstruction::create_concatenate(shape.clone(), ops, dimensions[0])?
            }
            InstrKind::Transpose { dimensions } => {
                HloInstruction::create_transpose(shape.clone(), ops[0], dimensions)?
            }
            InstrKind::Broadcast { dimensions } => {
                HloInstruction::create_broadcast(shape.clone(), ops[0], dimensions)?
            }
            InstrKind::Slice(a) => HloInstruction::create_slice(
                shape.clone(),
                ops[0],
                &a.starts,
                &a.limits,
                &a.strides,
            )?,
            InstrKind::Reduce(a) => {
                let to_apply = match context {
                    Some(ctx) => ctx.resolve_or_clone_computation(a.to_apply)?,
                    None => a.to_apply,
                };
                HloInstruction::create_reduce(shape.clone(), ops[0], ops[1], &a.dimensions, to_apply)?
            }
            InstrKind::Map(a) => {
                let to_apply = match context {
                    Some(ctx) => ctx.resolve_or_clone_computation(a.to_apply)?,
                    None => a.to_apply,
                };
                let mut map = HloInstruction::create_map(shape.clone(), ops, to_apply)?;
                if let InstrKind::Map(attrs) = &mut map.kind {
                    attrs.static_operands = a.static_operands.clone();
                }
                map
            }
            InstrKind::Fft(a) => {
                HloInstruction::create_fft(shape.clone(), ops[0], a.fft_type, &a.fft_length)?
            }
        };
        Ok(clone.with_name(self.name.clone()))
    }

    /// Produces the serializable record of this instruction.
    ///
    /// The slice in-place marker is backend metadata and is not part of the
    /// record.
    pub fn to_proto(&self) -> HloInstructionProto {
        let mut proto = HloInstructionProto {
            id: self.id.map_or(DETACHED_ID, |id| id.0),
            name: self.name.clone(),
            opcode: self.opcode().name().to_owned(),
            shape: ShapeProto::from_shape(&self.shape),
            operand_ids: self.operands.iter().map(|id| id.0).collect(),
            ..Default::default()
        };
        match &self.kind {
            InstrKind::Parameter { number } => proto.parameter_number = Some(*number),
            InstrKind::Constant { value } => proto.literal_bits = Some(value.to_bits()),
            InstrKind::Add | InstrKind::Multiply | InstrKind::Maximum | InstrKind::Minimum => {}
            InstrKind::BatchNormTraining(a)
            | InstrKind::BatchNormInference(a)
            | InstrKind::BatchNormGrad(a) => {
                proto.epsilon = Some(a.epsilon);
                proto.feature_index = Some(a.feature_index);
            }
            InstrKind::Send(a)
            | InstrKind::SendDone(a)
            | InstrKind::Recv(a)
            | InstrKind::RecvDone(a) => proto.channel_id = Some(a.channel_id),
            InstrKind::Reverse { dimensions }
            | InstrKind::Concatenate { dimensions }
            | InstrKind::Transpose { dimensions }
            | InstrKind::Broadcast { dimensions } => proto.dimensions = dimensions.clone(),
            InstrKind::Slice(a) => {
                proto.slice_dimensions = (0..a.starts.len())
                    .map(|d| SliceDimensionProto {
                        start: a.starts[d],
                        limit: a.limits[d],
                        stride: a.strides[d],
                    })
                    .collect();
            }
            InstrKind::Reduce(a) => {
                proto.dimensions = a.dimensions.clone();
                proto.called_computation_ids = vec![a.to_apply.0];
            }
            InstrKind::Map(a) => {
                proto.dimensions = a.dimensions.clone();
                proto.called_computation_ids = vec![a.to_apply.0];
                proto.static_operand_ids = a.static_operands.iter().map(|id| id.0).collect();
            }
            InstrKind::Fft(a) => {
                proto.fft_type = Some(a.fft_type.name().to_owned());
                proto.fft_length = a.fft_length.clone();
            }
        }
        proto
    }

    /// Rebuilds an instruction from its record.
    ///
    /// `operands` are the already-decoded operand instructions, in record
    /// order. `computations` and `instructions` translate record ids into
    /// the ids of the graph being rebuilt. The variant constructor runs, so
    /// a record that violates an invariant is rejected.
    pub fn from_proto(
        proto: &HloInstructionProto,
        operands: &[&HloInstruction],
        computations: &HashMap<u32, ComputationId>,
        instructions: &HashMap<u32, InstrId>,
    ) -> Result<HloInstruction, ProtoError> {
        let opcode = HloOpcode::from_name(&proto.opcode).ok_or_else(|| ProtoError::UnknownOpcode {
            name: proto.opcode.clone(),
        })?;
        if let Some(arity) = opcode.arity() {
            check_arity(opcode, arity, operands.len())?;
        }
        let shape = proto.shape.to_shape()?;
        let ops = operands;
        let epsilon = || proto.epsilon.ok_or_else(|| proto.missing("epsilon"));
        let feature_index = || proto.feature_index.ok_or_else(|| proto.missing("feature_index"));
        let channel_id = || proto.channel_id.ok_or_else(|| proto.missing("channel_id"));
        let to_apply = || -> Result<ComputationId, ProtoError> {
            let id = *proto
                .called_computation_ids
                .first()
                .ok_or_else(|| proto.missing("called_computation_ids"))?;
            computations
                .get(&id)
                .copied()
                .ok_or(ProtoError::DanglingComputation { id })
        };

        let instr = match opcode {
            HloOpcode::Parameter => {
                let number = proto
                    .parameter_number
                    .ok_or_else(|| proto.missing("parameter_number"))?;
                HloInstruction::create_parameter(number, shape)?
            }
            HloOpcode::Constant => {
                let bits = proto.literal_bits.ok_or_else(|| proto.missing("literal_bits"))?;
                let value = f64::from_bits(bits);
                HloInstruction::create_constant_with_shape(value, &shape)?
            }
            HloOpcode::Add | HloOpcode::Multiply | HloOpcode::Maximum | HloOpcode::Minimum => {
                HloInstruction::create_binary(opcode, shape, ops[0], ops[1])?
            }
            HloOpcode::BatchNormTraining => HloInstruction::create_batch_norm_training(
                shape,
                ops[0],
                ops[1],
                ops[2],
                epsilon()?,
                feature_index()?,
            )?,
            HloOpcode::BatchNormInference => HloInstruction::create_batch_norm_inference(
                shape,
                ops[0],
                ops[1],
                ops[2],
                ops[3],
                ops[4],
                epsilon()?,
                feature_index()?,
            )?,
            HloOpcode::BatchNormGrad => HloInstruction::create_batch_norm_grad(
                shape,
                ops[0],
                ops[1],
                ops[2],
                ops[3],
                ops[4],
                epsilon()?,
                feature_index()?,
            )?,
            HloOpcode::Send => HloInstruction::create_send(ops[0], channel_id()?)?,
            HloOpcode::SendDone => HloInstruction::create_send_done(ops[0])?,
            HloOpcode::Recv => {
                let data = shape.tuple_element(0).ok_or_else(|| proto.missing("shape.tuple_shapes"))?;
                HloInstruction::create_recv(data.clone(), channel_id()?)?
            }
            HloOpcode::RecvDone => HloInstruction::create_recv_done(ops[0])?,
            HloOpcode::Reverse => HloInstruction::create_reverse(shape, ops[0], &proto.dimensions)?,
            HloOpcode::Concatenate => {
                let dimension = *proto.dimensions.first().ok_or_else(|| proto.missing("dimensions"))?;
                HloInstruction::create_concatenate(shape, ops, dimension)?
            }
            HloOpcode::Transpose => HloInstruction::create_transpose(shape, ops[0], &proto.dimensions)?,
            HloOpcode::Broadcast => HloInstruction::create_broadcast(shape, ops[0], &proto.dimensions)?,
            HloOpcode::Slice => {
                let starts: Vec<i64> = proto.slice_dimensions.iter().map(|d| d.start).collect();
                let limits: Vec<i64> = proto.slice_dimensions.iter().map(|d| d.limit).collect();
                let strides: Vec<i64> = proto.slice_dimensions.iter().map(|d| d.stride).collect();
                HloInstruction::create_slice(shape, ops[0], &starts, &limits, &strides)?
            }
            HloOpcode::Reduce => {
                HloInstruction::create_reduce(shape, ops[0], ops[1], &proto.dimensions, to_apply()?)?
            }
            HloOpcode::Map => {
                let mut map = HloInstruction::create_map(shape, ops, to_apply()?)?;
                let statics = proto
                    .static_operand_ids
                    .iter()
                    .map(|id| {
                        instructions.get(id).copied().ok_or_else(|| ProtoError::DanglingOperand {
                            computation: proto.name.clone(),
                            id: *id,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if let InstrKind::Map(attrs) = &mut map.kind {
                    attrs.static_operands = statics;
                }
                map
            }
            HloOpcode::Fft => {
                let name = proto.fft_type.as_deref().ok_or_else(|| proto.missing("fft_type"))?;
                let fft_type = FftType::from_name(name).ok_or_else(|| ProtoError::UnknownFftType {
                    name: name.to_owned(),
                })?;
                HloInstruction::create_fft(shape, ops[0], fft_type, &proto.fft_length)?
            }
        };
        Ok(instr.with_name(proto.name.clone()))
    }
}

/// Renders an axis list as `dimensions={0,1}`.
pub(crate) fn dimensions_attribute(dimensions: &[i64]) -> String {
    format!("dimensions={{{}}}", join_i64(dimensions))
}

pub(crate) fn join_i64(values: &[i64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

pub(crate) fn check_arity(opcode: HloOpcode, expected: usize, got: usize) -> Result<(), InstrError> {
    if expected != got {
        return Err(InstrError::invalid(
            opcode,
            format!("expected {} operands, got {}", expected, got),
        ));
    }
    Ok(())
}

fn operand_ids(opcode: HloOpcode, operands: &[&HloInstruction]) -> Result<Vec<InstrId>, InstrError> {
    operands
        .iter()
        .map(|op| {
            op.id.ok_or_else(|| {
                InstrError::invalid(
                    opcode,
                    format!("operand '{}' has not been added to a computation", op.name),
                )
            })
        })
        .collect()
}
