use std::collections::HashMap;

use spv_words::spv::{capability, decoration, op};
use spv_words::{Instruction, RawModule};

use crate::error::AnalyzeError;

/// Result of the single forward index-building pass.
pub(crate) enum IndexOutcome<'a> {
    /// The module uses buffer device addressing; deeper analysis can run.
    Analyzable(ModuleIndex<'a>),
    /// A function body began before any `PhysicalStorageBufferAddresses`
    /// capability was declared: nothing in the module can produce a buffer
    /// device address, so the run short-circuits with an empty map.
    NoBufferAddressing,
}

/// Forward lookup tables over one module, built once and read-only afterwards.
///
/// Owned by the analysis run (never process-global), so concurrent runs over
/// different modules cannot observe each other's state.
pub(crate) struct ModuleIndex<'a> {
    definitions: HashMap<u32, Instruction<'a>>,
    stores: Vec<Instruction<'a>>,
    decorations: Vec<Instruction<'a>>,
    loads: Vec<Instruction<'a>>,
}

impl<'a> ModuleIndex<'a> {
    pub(crate) fn build(module: &RawModule<'a>) -> Result<IndexOutcome<'a>, AnalyzeError> {
        let mut index = ModuleIndex {
            definitions: HashMap::new(),
            stores: Vec::new(),
            decorations: Vec::new(),
            loads: Vec::new(),
        };
        let mut addressing_capability = false;

        for insn in module.instructions() {
            let insn = insn?;

            match insn.opcode() {
                op::CAPABILITY => {
                    if insn.operand(0) == Some(capability::PHYSICAL_STORAGE_BUFFER_ADDRESSES) {
                        addressing_capability = true;
                    }
                }
                // All capabilities precede the first function body, so the
                // gate is decided by the time one begins.
                op::FUNCTION if !addressing_capability => {
                    return Ok(IndexOutcome::NoBufferAddressing);
                }
                op::STORE => index.stores.push(insn),
                op::DECORATE => index.decorations.push(insn),
                op::LOAD => index.loads.push(insn),
                _ => {}
            }

            let result_id = insn.result_id();
            if result_id != 0 {
                // Result ids are unique in well-formed input; first writer
                // wins on hostile input so later redefinitions cannot redirect
                // an in-progress trace.
                index.definitions.entry(result_id).or_insert(insn);
            }
        }

        Ok(IndexOutcome::Analyzable(index))
    }

    /// The defining instruction of `id`, if any. Id 0 never resolves.
    pub(crate) fn definition(&self, id: u32) -> Option<Instruction<'a>> {
        self.definitions.get(&id).copied()
    }

    /// All `OpLoad` instructions, in stream order.
    pub(crate) fn loads(&self) -> &[Instruction<'a>] {
        &self.loads
    }

    /// Resolves a function-local variable to the value of the first store
    /// targeting it, in stream order.
    ///
    /// Picking the textually first store is a documented approximation: under
    /// real control flow it is not necessarily the last-executed one.
    pub(crate) fn find_variable_storing(&self, variable_id: u32) -> Option<Instruction<'a>> {
        self.stores
            .iter()
            .find(|store| store.operand(0) == Some(variable_id))
            .and_then(|store| self.definition(store.operand(1)?))
    }

    /// The `DescriptorSet` and `Binding` decorations attached to `target`,
    /// defaulting each to 0 when absent (matching how an undecorated binding
    /// lands in slot (0, 0)).
    pub(crate) fn descriptor_slot(&self, target: u32) -> (u32, u32) {
        let mut set = 0;
        let mut binding = 0;
        for insn in &self.decorations {
            if insn.operand(0) != Some(target) {
                continue;
            }
            match insn.operand(1) {
                Some(decoration::DESCRIPTOR_SET) => set = insn.operand(2).unwrap_or(0),
                Some(decoration::BINDING) => binding = insn.operand(2).unwrap_or(0),
                _ => {}
            }
        }
        (set, binding)
    }
}
