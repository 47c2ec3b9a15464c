//! Module verification pass.
//!
//! Checks the structural rules that individual constructors cannot see
//! because they span several instructions or computations. Builders already
//! enforce most of these; the pass re-checks modules that were mutated or
//! assembled by other means.

use std::collections::HashSet;

use crate::error::PassError;
use crate::ir::channel::verify_channels;
use crate::ir::instr::InstrKind;
use crate::ir::module::HloModule;

/// Validates module invariants.
///
/// Checks:
/// 1. Every operand and Map static operand refers to an earlier instruction
///    of the same computation.
/// 2. Every called computation exists and has a lower id than its caller.
/// 3. Parameter numbers are unique within each computation.
/// 4. Channels pair up: one Send and one Recv per channel id, each completed
///    exactly once. With `require_complete_channels` unset, a channel with
///    only one endpoint is accepted.
#[derive(Debug, Clone, Copy)]
pub struct VerifyPass {
    pub require_complete_channels: bool,
}

impl Default for VerifyPass {
    fn default() -> Self {
        Self { require_complete_channels: true }
    }
}

impl VerifyPass {
    /// Runs every check on `module` and returns the first violation.
    pub fn run(&self, module: &HloModule) -> Result<(), PassError> {
        for comp in module.computations() {
            let mut parameters: HashSet<i64> = HashSet::new();
            for (index, instr) in comp.instructions().iter().enumerate() {
                let statics = match instr.kind() {
                    InstrKind::Map(attrs) => attrs.static_operands.as_slice(),
                    _ => &[],
                };
                for operand in instr.operands().iter().chain(statics) {
                    if operand.0 as usize >= index {
                        return Err(PassError::OperandOrder {
                            computation: comp.name().to_owned(),
                            instr: instr.name().to_owned(),
                            operand: operand.0,
                        });
                    }
                }

                for callee in instr.called_computations() {
                    if callee.0 >= comp.id().0 || module.computation(callee).is_none() {
                        return Err(PassError::MissingCallee {
                            computation: comp.name().to_owned(),
                            instr: instr.name().to_owned(),
                            callee: callee.0,
                        });
                    }
                }

                if let InstrKind::Parameter { number } = instr.kind() {
                    if !parameters.insert(*number) {
                        return Err(PassError::DuplicateParameter {
                            computation: comp.name().to_owned(),
                            number: *number,
                        });
                    }
                }
            }
        }

        let channels = verify_channels(module)?;
        if self.require_complete_channels {
            if let Some((channel_id, status)) = channels.iter().find(|(_, s)| !s.is_complete()) {
                return Err(PassError::Channel {
                    channel_id: *channel_id,
                    detail: format!(
                        "incomplete channel (send: {:?}, recv: {:?})",
                        status.send, status.recv
                    ),
                });
            }
        }
        tracing::debug!(module = %module.name, channels = channels.len(), "module verified");
        Ok(())
    }
}
