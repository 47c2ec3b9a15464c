//! Serializable records for modules, computations and instructions.
//!
//! The records mirror the in-memory graph as a flat, id-keyed layout:
//! operands and called computations are referenced by id, never embedded.
//! Attribute fields carry the same typed values `identical_slow_path`
//! compares, so a record that decodes and re-encodes is field-equal to the
//! original.
//!
//! ## Layout (version 1)
//!
//! ```text
//! HloModuleProto      version | name | entry_computation_id | next_channel_id | [computation]
//! HloComputationProto id | name | root_id | [instruction]
//! HloInstructionProto id | name | opcode | shape | operand_ids | <opcode attributes>
//! ```
//!
//! The byte-level encoding is left to serde; `to_json` / `from_json` are
//! provided for tooling and tests.

use serde::{Deserialize, Serialize};

use crate::error::ProtoError;
use crate::ir::types::{PrimitiveType, Shape};

/// Current record layout version.
pub const PROTO_VERSION: u32 = 1;

const TUPLE_ELEMENT_TYPE: &str = "tuple";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeProto {
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tuple_shapes: Vec<ShapeProto>,
}

impl ShapeProto {
    pub fn from_shape(shape: &Shape) -> Self {
        match shape {
            Shape::Array { element_type, dims } => ShapeProto {
                element_type: element_type.name().to_owned(),
                dimensions: dims.clone(),
                tuple_shapes: Vec::new(),
            },
            Shape::Tuple(elements) => ShapeProto {
                element_type: TUPLE_ELEMENT_TYPE.to_owned(),
                dimensions: Vec::new(),
                tuple_shapes: elements.iter().map(ShapeProto::from_shape).collect(),
            },
        }
    }

    pub fn to_shape(&self) -> Result<Shape, ProtoError> {
        if self.element_type == TUPLE_ELEMENT_TYPE {
            let elements = self
                .tuple_shapes
                .iter()
                .map(ShapeProto::to_shape)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Shape::tuple(elements));
        }
        let element_type = PrimitiveType::from_name(&self.element_type).ok_or_else(|| {
            ProtoError::UnknownElementType {
                name: self.element_type.clone(),
            }
        })?;
        Ok(Shape::array(element_type, self.dimensions.clone()))
    }
}

/// One `[start:limit:stride]` triple of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceDimensionProto {
    pub start: i64,
    pub limit: i64,
    pub stride: i64,
}

/// Record of a single instruction.
///
/// Only the attribute fields that belong to `opcode` are populated; the
/// others keep their defaults and are skipped on encode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HloInstructionProto {
    pub id: u32,
    pub name: String,
    pub opcode: String,
    pub shape: ShapeProto,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operand_ids: Vec<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_number: Option<i64>,
    /// `f64::to_bits` of a constant. JSON has no NaN or infinity, and the
    /// bit pattern also keeps the sign of zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_bits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slice_dimensions: Vec<SliceDimensionProto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fft_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fft_length: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub called_computation_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_operand_ids: Vec<u32>,
}

impl HloInstructionProto {
    pub(crate) fn missing(&self, field: &'static str) -> ProtoError {
        ProtoError::MissingField {
            opcode: self.opcode.clone(),
            field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HloComputationProto {
    pub id: u32,
    pub name: String,
    pub root_id: u32,
    pub instructions: Vec<HloInstructionProto>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HloModuleProto {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_computation_id: Option<u32>,
    pub next_channel_id: i64,
    /// Callees precede their callers.
    pub computations: Vec<HloComputationProto>,
}

impl HloModuleProto {
    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtoError> {
        let proto: HloModuleProto = serde_json::from_str(text)?;
        if proto.version != PROTO_VERSION {
            return Err(ProtoError::Version {
                found: proto.version,
                expected: PROTO_VERSION,
            });
        }
        Ok(proto)
    }
}
