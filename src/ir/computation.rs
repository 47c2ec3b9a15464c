use std::collections::{HashMap, HashSet};

use crate::error::{InstrError, ProtoError};
use crate::ir::instr::{EqComputations, HloInstruction, InstrId, InstrKind};
use crate::proto::HloComputationProto;

/// Index of a computation within its module's computation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComputationId(pub u32);

impl std::fmt::Display for ComputationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "computation{}", self.0)
    }
}

/// A dataflow graph: an arena of instructions and a root.
///
/// Invariants:
/// - `instructions[n].id == Some(InstrId(n))`.
/// - Every operand of `instructions[n]` has an id below `n`, so arena order
///   is a valid topological order.
/// - `root` indexes `instructions`; the arena is never empty.
#[derive(Debug)]
pub struct HloComputation {
    pub(crate) id: ComputationId,
    pub(crate) name: String,
    pub(crate) instructions: Vec<HloInstruction>,
    pub(crate) root: InstrId,
}

impl HloComputation {
    pub fn id(&self) -> ComputationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruction(&self, id: InstrId) -> Option<&HloInstruction> {
        self.instructions.get(id.0 as usize)
    }

    /// Mutable access, used to set the slice in-place marker.
    pub fn instruction_mut(&mut self, id: InstrId) -> Option<&mut HloInstruction> {
        self.instructions.get_mut(id.0 as usize)
    }

    pub fn instruction_by_name(&self, name: &str) -> Option<&HloInstruction> {
        self.instructions.iter().find(|i| i.name() == name)
    }

    pub fn instructions(&self) -> &[HloInstruction] {
        &self.instructions
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn root(&self) -> InstrId {
        self.root
    }

    pub fn root_instruction(&self) -> &HloInstruction {
        &self.instructions[self.root.0 as usize]
    }

    /// Parameters ordered by parameter number.
    pub fn parameter_instructions(&self) -> Vec<&HloInstruction> {
        let mut params: Vec<(i64, &HloInstruction)> = self
            .instructions
            .iter()
            .filter_map(|i| match i.kind() {
                InstrKind::Parameter { number } => Some((*number, i)),
                _ => None,
            })
            .collect();
        params.sort_by_key(|(number, _)| *number);
        params.into_iter().map(|(_, i)| i).collect()
    }

    /// Every sub-computation called from this computation, first use first,
    /// without duplicates.
    pub fn called_computations(&self) -> Vec<ComputationId> {
        let mut seen = HashSet::new();
        self.instructions
            .iter()
            .flat_map(|i| i.called_computations())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Structural equality: walks both graphs from their roots in lockstep
    /// and compares every reached pair of instructions with `identical`.
    ///
    /// Sub-computations are compared through `eq_computations`. Instructions
    /// unreachable from the root do not take part.
    pub fn equal(&self, other: &HloComputation, eq_computations: EqComputations<'_>) -> bool {
        let mut visited: HashSet<(InstrId, InstrId)> = HashSet::new();
        let mut worklist = vec![(self.root, other.root)];
        while let Some((a, b)) = worklist.pop() {
            if !visited.insert((a, b)) {
                continue;
            }
            let (Some(lhs), Some(rhs)) = (self.instruction(a), other.instruction(b)) else {
                return false;
            };
            // Operand pairs are queued below and compared on their own turn.
            if !lhs.identical(rhs, &|_: InstrId, _: InstrId| true, eq_computations) {
                return false;
            }
            worklist.extend(lhs.operands().iter().copied().zip(rhs.operands().iter().copied()));
        }
        true
    }

    pub fn to_proto(&self) -> HloComputationProto {
        HloComputationProto {
            id: self.id.0,
            name: self.name.clone(),
            root_id: self.root.0,
            instructions: self.instructions.iter().map(HloInstruction::to_proto).collect(),
        }
    }

    /// Rebuilds a computation from its record. `computations` translates the
    /// record's computation ids into ids of the module being rebuilt.
    pub fn from_proto(
        proto: &HloComputationProto,
        computations: &HashMap<u32, ComputationId>,
    ) -> Result<HloComputation, ProtoError> {
        if proto.instructions.is_empty() {
            return Err(ProtoError::EmptyComputation {
                computation: proto.name.clone(),
            });
        }
        let dangling = |id: u32| ProtoError::DanglingOperand {
            computation: proto.name.clone(),
            id,
        };
        let mut builder = HloComputationBuilder::new(proto.name.clone());
        let mut ids: HashMap<u32, InstrId> = HashMap::new();
        for record in &proto.instructions {
            let instr = {
                let operands = record
                    .operand_ids
                    .iter()
                    .map(|id| {
                        ids.get(id)
                            .and_then(|new_id| builder.instruction(*new_id))
                            .ok_or_else(|| dangling(*id))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                HloInstruction::from_proto(record, &operands, computations, &ids)?
            };
            let new_id = builder.add_instruction(instr)?;
            ids.insert(record.id, new_id);
        }
        let root = ids.get(&proto.root_id).copied().ok_or_else(|| dangling(proto.root_id))?;
        Ok(builder.build_with_root(root)?)
    }
}

/// Builder for constructing an `HloComputation` incrementally.
///
/// Call order:
/// 1. `add_instruction()` for every node, operands before users
/// 2. `build()` or `build_with_root()` to seal the computation
///
/// The sealed computation gets its `ComputationId` from
/// `HloModule::add_computation`.
#[derive(Debug)]
pub struct HloComputationBuilder {
    name: String,
    instructions: Vec<HloInstruction>,
    names: HashSet<String>,
    parameter_numbers: HashSet<i64>,
}

impl HloComputationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: Vec::new(),
            names: HashSet::new(),
            parameter_numbers: HashSet::new(),
        }
    }

    /// Appends `instr` and returns its id.
    ///
    /// Operands (and Map static operands) must already be in this builder.
    /// An empty name becomes `<opcode>.<id>`; a name already in use gets the
    /// id appended.
    pub fn add_instruction(&mut self, mut instr: HloInstruction) -> Result<InstrId, InstrError> {
        let id = InstrId(self.instructions.len() as u32);
        let opcode = instr.opcode();
        let static_operands = match instr.kind() {
            InstrKind::Map(attrs) => attrs.static_operands.as_slice(),
            _ => &[],
        };
        if let Some(bad) = instr
            .operands()
            .iter()
            .chain(static_operands)
            .find(|op| op.0 >= id.0)
        {
            return Err(InstrError::invalid(
                opcode,
                format!("operand {} is not defined in computation '{}'", bad, self.name),
            ));
        }
        if let InstrKind::Parameter { number } = instr.kind() {
            if !self.parameter_numbers.insert(*number) {
                return Err(InstrError::invalid(
                    opcode,
                    format!("parameter number {} is already used in '{}'", number, self.name),
                ));
            }
        }

        let mut name = if instr.name().is_empty() {
            format!("{}.{}", opcode, id.0)
        } else {
            instr.name().to_owned()
        };
        while self.names.contains(&name) {
            name = format!("{}.{}", name, id.0);
        }
        self.names.insert(name.clone());

        instr.name = name;
        instr.id = Some(id);
        tracing::trace!(computation = %self.name, instr = %instr.name, %id, "add instruction");
        self.instructions.push(instr);
        Ok(id)
    }

    pub fn instruction(&self, id: InstrId) -> Option<&HloInstruction> {
        self.instructions.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Seals the computation with the last added instruction as root.
    pub fn build(self) -> Result<HloComputation, InstrError> {
        let last = self.instructions.len().checked_sub(1).ok_or_else(|| self.empty_error())?;
        self.build_with_root(InstrId(last as u32))
    }

    pub fn build_with_root(self, root: InstrId) -> Result<HloComputation, InstrError> {
        if self.instructions.is_empty() {
            return Err(self.empty_error());
        }
        if root.0 as usize >= self.instructions.len() {
            return Err(InstrError::InvalidArgument {
                opcode: format!("computation '{}'", self.name),
                detail: format!("root {} is not an instruction of this computation", root),
            });
        }
        Ok(HloComputation {
            id: ComputationId(0), // reassigned by HloModule::add_computation
            name: self.name,
            instructions: self.instructions,
            root,
        })
    }

    fn empty_error(&self) -> InstrError {
        InstrError::InvalidArgument {
            opcode: format!("computation '{}'", self.name),
            detail: "a computation needs at least one instruction".to_owned(),
        }
    }
}
