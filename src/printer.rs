//! HLO text printer.
//!
//! Emits a human-readable text representation of an `HloModule`.
//! Output is deterministic: computations are printed in `ComputationId`
//! order (callees first), instructions in arena order.
//!
//! ```text
//! HloModule m, entry=%main
//!
//! %add {
//!   %x = f32[] parameter(0)
//!   %y = f32[] parameter(1)
//!   ROOT %sum = f32[] add(%x, %y)
//! }
//!
//! ENTRY %main {
//!   ...
//!   ROOT %r = f32[4] reduce(%a, %zero), dimensions={1}, to_apply=%add
//! }
//! ```

use std::fmt::Write;

use crate::ir::computation::HloComputation;
use crate::ir::instr::{HloInstruction, InstrId, InstrKind};
use crate::ir::module::HloModule;

/// Printer knobs. The default prints names only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    /// Prefix every operand with its shape: `add(f32[4] %a, f32[4] %b)`.
    pub print_operand_shapes: bool,
    /// Append the arena id of every instruction as a trailing comment.
    pub print_ids: bool,
}

/// Emits a full text dump of the module.
pub fn emit_module_text(module: &HloModule, options: &PrintOptions) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write!(out, "HloModule {}", module.name)?;
    if let Some(entry) = module.entry_computation() {
        write!(out, ", entry=%{}", entry.name())?;
    }
    writeln!(out)?;
    for comp in module.computations() {
        writeln!(out)?;
        let is_entry = module.entry_computation_id() == Some(comp.id());
        emit_computation(&mut out, Some(module), comp, is_entry, options)?;
    }
    Ok(out)
}

/// Emits one computation. Called computations are named through `module`
/// when given, and by id otherwise.
pub fn emit_computation_text(
    module: Option<&HloModule>,
    comp: &HloComputation,
    options: &PrintOptions,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let is_entry = module.and_then(HloModule::entry_computation_id) == Some(comp.id());
    emit_computation(&mut out, module, comp, is_entry, options)?;
    Ok(out)
}

/// Emits a single instruction line, without indentation or `ROOT` marker.
pub fn instruction_to_string(
    module: Option<&HloModule>,
    comp: &HloComputation,
    instr: &HloInstruction,
    options: &PrintOptions,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    emit_instr(&mut out, module, comp, instr, options)?;
    Ok(out)
}

impl HloInstruction {
    /// Renders `%name = shape opcode(operands), attributes` with names
    /// resolved through `comp` (and `module` for called computations).
    pub fn to_string_with(
        &self,
        module: Option<&HloModule>,
        comp: &HloComputation,
        options: &PrintOptions,
    ) -> Result<String, std::fmt::Error> {
        instruction_to_string(module, comp, self, options)
    }
}

fn emit_computation(
    out: &mut String,
    module: Option<&HloModule>,
    comp: &HloComputation,
    is_entry: bool,
    options: &PrintOptions,
) -> Result<(), std::fmt::Error> {
    if is_entry {
        write!(out, "ENTRY ")?;
    }
    writeln!(out, "%{} {{", comp.name())?;
    for instr in comp.instructions() {
        write!(out, "  ")?;
        if instr.id() == Some(comp.root()) {
            write!(out, "ROOT ")?;
        }
        emit_instr(out, module, comp, instr, options)?;
        writeln!(out)?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn emit_instr(
    out: &mut String,
    module: Option<&HloModule>,
    comp: &HloComputation,
    instr: &HloInstruction,
    options: &PrintOptions,
) -> Result<(), std::fmt::Error> {
    write!(out, "%{} = {} {}(", instr.name(), instr.shape(), instr.opcode())?;
    match instr.kind() {
        InstrKind::Parameter { number } => write!(out, "{}", number)?,
        InstrKind::Constant { value } => write!(out, "{}", value)?,
        _ => {
            for (i, operand) in instr.operands().iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                emit_operand(out, comp, *operand, options)?;
            }
        }
    }
    write!(out, ")")?;

    let attrs = match instr.kind() {
        InstrKind::Map(map) => map.attributes_with(|id| operand_name(comp, id)),
        _ => instr.extra_attributes_to_string(),
    };
    for attr in attrs {
        write!(out, ", {}", attr)?;
    }
    for callee in instr.called_computations() {
        match module.and_then(|m| m.computation(callee)) {
            Some(c) => write!(out, ", to_apply=%{}", c.name())?,
            None => write!(out, ", to_apply={}", callee)?,
        }
    }
    if let InstrKind::Slice(attrs) = instr.kind() {
        if attrs.is_in_place {
            write!(out, ", in_place=true")?;
        }
    }
    if options.print_ids {
        if let Some(id) = instr.id() {
            write!(out, "  // {}", id)?;
        }
    }
    Ok(())
}

/// `%name` of an instruction in `comp`, or its bare id when it is not there.
fn operand_name(comp: &HloComputation, id: InstrId) -> String {
    match comp.instruction(id) {
        Some(op) => format!("%{}", op.name()),
        None => id.to_string(),
    }
}

fn emit_operand(
    out: &mut String,
    comp: &HloComputation,
    operand: InstrId,
    options: &PrintOptions,
) -> Result<(), std::fmt::Error> {
    if options.print_operand_shapes {
        if let Some(op) = comp.instruction(operand) {
            write!(out, "{} ", op.shape())?;
        }
    }
    write!(out, "{}", operand_name(comp, operand))
}
