//! Per-pass state for cloning instructions and computations across modules.
//!
//! A `CloneContext` remembers which computations and instructions of the
//! source module it has already cloned into the target module. Every later
//! reference to the same source node resolves to the same clone, so a
//! sub-computation called from many places is copied once and stays shared.
//!
//! One context serves one cloning pass; it is not meant to be shared between
//! threads.

use std::collections::HashMap;

use crate::error::InstrError;
use crate::ir::computation::{ComputationId, HloComputationBuilder};
use crate::ir::instr::{HloInstruction, InstrId};
use crate::ir::module::{suffixed, HloModule};

pub struct CloneContext<'a> {
    source: &'a HloModule,
    target: &'a mut HloModule,
    suffix: String,
    computations: HashMap<ComputationId, ComputationId>,
    instructions: HashMap<(ComputationId, InstrId), InstrId>,
}

impl<'a> CloneContext<'a> {
    /// Clones read from `source` and land in `target`. Cloned computations
    /// are named `<name>.<suffix>` (or keep their name if `suffix` is empty).
    pub fn new(source: &'a HloModule, target: &'a mut HloModule, suffix: impl Into<String>) -> Self {
        Self {
            source,
            target,
            suffix: suffix.into(),
            computations: HashMap::new(),
            instructions: HashMap::new(),
        }
    }

    pub fn source(&self) -> &HloModule {
        self.source
    }

    pub fn target(&self) -> &HloModule {
        self.target
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn find_computation(&self, old: ComputationId) -> Option<ComputationId> {
        self.computations.get(&old).copied()
    }

    /// Records that `old` is represented by `new` in the target. Later
    /// references to `old` resolve to `new` without cloning.
    pub fn map_computation(&mut self, old: ComputationId, new: ComputationId) {
        self.computations.insert(old, new);
    }

    pub fn find_instruction(&self, computation: ComputationId, old: InstrId) -> Option<InstrId> {
        self.instructions.get(&(computation, old)).copied()
    }

    pub fn map_instruction(&mut self, computation: ComputationId, old: InstrId, new: InstrId) {
        self.instructions.insert((computation, old), new);
    }

    /// Returns the target-side id of source computation `old`, cloning it
    /// (and, transitively, everything it calls) on first request.
    pub fn resolve_or_clone_computation(&mut self, old: ComputationId) -> Result<ComputationId, InstrError> {
        if let Some(new) = self.find_computation(old) {
            tracing::trace!(%old, %new, "reuse cloned computation");
            return Ok(new);
        }
        let source = self.source;
        let comp = source.computation(old).ok_or_else(|| InstrError::InvalidArgument {
            opcode: format!("module '{}'", source.name),
            detail: format!("{} is not in the source module", old),
        })?;

        let mut builder = HloComputationBuilder::new(suffixed(comp.name(), &self.suffix));
        for instr in comp.instructions() {
            let clone = {
                let operands = instr
                    .operands()
                    .iter()
                    .map(|op| {
                        self.find_instruction(old, *op)
                            .and_then(|new| builder.instruction(new))
                            .ok_or_else(|| {
                                InstrError::invalid(
                                    instr.opcode(),
                                    format!("operand {} of '{}' has no clone", op, instr.name()),
                                )
                            })
                    })
                    .collect::<Result<Vec<&HloInstruction>, _>>()?;
                instr.clone_with_new_operands(instr.shape(), &operands, Some(&mut *self))?
            };
            let new_id = builder.add_instruction(clone)?;
            if let Some(old_id) = instr.id() {
                self.map_instruction(old, old_id, new_id);
            }
        }
        let root = self.find_instruction(old, comp.root()).ok_or_else(|| {
            InstrError::invalid(comp.root_instruction().opcode(), "root was not cloned")
        })?;
        let new = self.target.add_computation(builder.build_with_root(root)?)?;
        self.map_computation(old, new);
        tracing::trace!(%old, %new, name = comp.name(), "cloned computation");
        Ok(new)
    }
}
