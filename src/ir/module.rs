use std::collections::HashMap;

use crate::error::{InstrError, ProtoError};
use crate::ir::clone_context::CloneContext;
use crate::ir::computation::{ComputationId, HloComputation};
use crate::ir::variants::MAX_CHANNEL_ID;
use crate::proto::{HloModuleProto, PROTO_VERSION};

/// The top-level container: an arena of computations and an optional entry.
///
/// Invariants:
/// - Computation names are unique within a module.
/// - `ComputationId(n)` always indexes `computations[n]`.
/// - A computation only calls computations with a lower id, so the call
///   graph is acyclic and arena order lists callees before callers.
/// - `next_channel_id` is above every channel id used by an instruction.
#[derive(Debug, Default)]
pub struct HloModule {
    pub name: String,
    pub(crate) computations: Vec<HloComputation>,
    pub(crate) entry: Option<ComputationId>,
    pub(crate) next_channel_id: i64,
}

impl HloModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            computations: Vec::new(),
            entry: None,
            next_channel_id: 0,
        }
    }

    /// Seals and registers a computation built by `HloComputationBuilder`.
    ///
    /// Fails if the name is taken or if the computation calls a computation
    /// that is not yet in this module.
    pub fn add_computation(&mut self, mut comp: HloComputation) -> Result<ComputationId, InstrError> {
        if self.computation_by_name(&comp.name).is_some() {
            return Err(module_error(
                &self.name,
                format!("computation '{}' already defined", comp.name),
            ));
        }
        let id = ComputationId(self.computations.len() as u32);
        for instr in comp.instructions() {
            if let Some(callee) = instr.called_computations().into_iter().find(|c| c.0 >= id.0) {
                return Err(module_error(
                    &self.name,
                    format!(
                        "instruction '{}' in '{}' calls {} which is not in the module",
                        instr.name(),
                        comp.name,
                        callee
                    ),
                ));
            }
            if let Ok(channel_id) = instr.channel_id() {
                let next = channel_id.checked_add(1).ok_or_else(|| {
                    module_error(
                        &self.name,
                        format!("channel id {} of '{}' has no successor", channel_id, instr.name()),
                    )
                })?;
                self.next_channel_id = self.next_channel_id.max(next);
            }
        }
        comp.id = id;
        self.computations.push(comp);
        Ok(id)
    }

    /// Adds `comp` and makes it the entry computation.
    pub fn add_entry_computation(&mut self, comp: HloComputation) -> Result<ComputationId, InstrError> {
        let id = self.add_computation(comp)?;
        self.entry = Some(id);
        Ok(id)
    }

    pub fn computation(&self, id: ComputationId) -> Option<&HloComputation> {
        self.computations.get(id.0 as usize)
    }

    pub fn computation_mut(&mut self, id: ComputationId) -> Option<&mut HloComputation> {
        self.computations.get_mut(id.0 as usize)
    }

    pub fn computation_by_name(&self, name: &str) -> Option<&HloComputation> {
        self.computations.iter().find(|c| c.name == name)
    }

    pub fn computations(&self) -> &[HloComputation] {
        &self.computations
    }

    pub fn entry_computation_id(&self) -> Option<ComputationId> {
        self.entry
    }

    pub fn entry_computation(&self) -> Option<&HloComputation> {
        self.entry.and_then(|id| self.computation(id))
    }

    /// Allocates a fresh channel id. Fails once the id space is exhausted.
    pub fn next_channel_id(&mut self) -> Result<i64, InstrError> {
        let id = self.next_channel_id;
        if id > MAX_CHANNEL_ID {
            return Err(module_error(
                &self.name,
                format!("channel ids are exhausted (next would be {})", id),
            ));
        }
        self.next_channel_id = id + 1;
        Ok(id)
    }

    /// Structural equality of computation `a` of this module and computation
    /// `b` of `other`. Sub-computations are compared recursively.
    pub fn computations_equal(&self, a: ComputationId, other: &HloModule, b: ComputationId) -> bool {
        match (self.computation(a), other.computation(b)) {
            (Some(lhs), Some(rhs)) => {
                lhs.equal(rhs, &|x: ComputationId, y: ComputationId| {
                    self.computations_equal(x, other, y)
                })
            }
            _ => false,
        }
    }

    /// Returns a copy of this module in which every computation is cloned
    /// exactly once. Computations shared by several callers stay shared.
    pub fn deep_clone(&self, suffix: &str) -> Result<HloModule, InstrError> {
        tracing::debug!(module = %self.name, suffix, "deep clone");
        let mut target = HloModule::new(suffixed(&self.name, suffix));
        let entry = {
            let mut context = CloneContext::new(self, &mut target, suffix);
            for comp in &self.computations {
                context.resolve_or_clone_computation(comp.id)?;
            }
            match self.entry {
                Some(id) => Some(context.resolve_or_clone_computation(id)?),
                None => None,
            }
        };
        target.entry = entry;
        target.next_channel_id = target.next_channel_id.max(self.next_channel_id);
        Ok(target)
    }

    pub fn to_proto(&self) -> HloModuleProto {
        HloModuleProto {
            version: PROTO_VERSION,
            name: self.name.clone(),
            entry_computation_id: self.entry.map(|id| id.0),
            next_channel_id: self.next_channel_id,
            computations: self.computations.iter().map(HloComputation::to_proto).collect(),
        }
    }

    /// Rebuilds a module from its record. Every instruction goes through its
    /// constructor again, so records that violate an invariant are rejected.
    pub fn from_proto(proto: &HloModuleProto) -> Result<HloModule, ProtoError> {
        if proto.version != PROTO_VERSION {
            return Err(ProtoError::Version {
                found: proto.version,
                expected: PROTO_VERSION,
            });
        }
        let mut module = HloModule::new(proto.name.clone());
        let mut ids: HashMap<u32, ComputationId> = HashMap::new();
        for record in &proto.computations {
            let comp = HloComputation::from_proto(record, &ids)?;
            let id = module.add_computation(comp)?;
            ids.insert(record.id, id);
        }
        module.entry = match proto.entry_computation_id {
            Some(id) => Some(
                ids.get(&id)
                    .copied()
                    .ok_or(ProtoError::DanglingComputation { id })?,
            ),
            None => None,
        };
        module.next_channel_id = module.next_channel_id.max(proto.next_channel_id);
        tracing::debug!(
            module = %module.name,
            computations = module.computations.len(),
            "decoded module"
        );
        Ok(module)
    }
}

/// `name.suffix`, or `name` when the suffix is empty.
pub(crate) fn suffixed(name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", name, suffix)
    }
}

fn module_error(module: &str, detail: String) -> InstrError {
    InstrError::InvalidArgument {
        opcode: format!("module '{}'", module),
        detail,
    }
}
