//! Traces which vertex input locations feed the `Position` built-in.
//!
//! A vertex shader's clip-space position is usually some arithmetic over one
//! of its input attributes (commonly `mvp * vec4(in_pos, 1.0)`). This crate
//! finds the `Position` built-in output, walks every store to it backward
//! through the module's def-use graph, and reports the `Location`-decorated
//! input variables the stored value was computed from.

#![forbid(unsafe_code)]

use std::collections::{BTreeSet, HashMap};

use spv_words::spv::{built_in, decoration, execution_model, op, storage_class};
use spv_words::{Instruction, ModuleError, RawModule};
use tracing::warn;

const MAX_SEARCH_STEPS: usize = 256;
const MAX_SEARCH_DEPTH: usize = 64;

/// What the trace found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexTraceOutcome {
    /// The module declares no vertex entry point, so there is no `Position`
    /// built-in to find.
    NotAVertexStage,
    /// The input locations that contribute to the value stored to `Position`.
    /// Empty when the position is written from constants alone, or when the
    /// built-in is never written.
    InputLocations(BTreeSet<u32>),
}

/// Analyzes one module for the inputs feeding its `Position` built-in.
///
/// Malformed word streams are the only failure; values the walk cannot see
/// through are logged and skipped.
pub fn trace_position_inputs(words: &[u32]) -> Result<VertexTraceOutcome, ModuleError> {
    let module = RawModule::new(words)?;

    let mut definitions: HashMap<u32, Instruction<'_>> = HashMap::new();
    let mut input_locations: HashMap<u32, u32> = HashMap::new();
    let mut output_variables: Vec<Instruction<'_>> = Vec::new();
    let mut stores: Vec<Instruction<'_>> = Vec::new();
    let mut has_vertex_entry_point = false;
    // The Position built-in is decorated either on the output variable
    // directly or on a member of a block struct; in the block case the struct
    // type id recorded here is resolved to the output variable below.
    let mut position_target = 0u32;

    for insn in module.instructions() {
        let insn = insn?;

        let result_id = insn.result_id();
        if result_id != 0 {
            definitions.entry(result_id).or_insert(insn);
        }

        match insn.opcode() {
            op::ENTRY_POINT => {
                if insn.operand(0) == Some(execution_model::VERTEX) {
                    has_vertex_entry_point = true;
                }
            }
            op::DECORATE => {
                if insn.operand(1) == Some(decoration::BUILT_IN)
                    && insn.operand(2) == Some(built_in::POSITION)
                {
                    position_target = insn.operand(0).unwrap_or(0);
                }
                if insn.operand(1) == Some(decoration::LOCATION) {
                    if let (Some(target), Some(location)) = (insn.operand(0), insn.operand(2)) {
                        input_locations.insert(target, location);
                    }
                }
            }
            op::MEMBER_DECORATE => {
                if insn.operand(2) == Some(decoration::BUILT_IN)
                    && insn.operand(3) == Some(built_in::POSITION)
                {
                    position_target = insn.operand(0).unwrap_or(0);
                }
            }
            op::VARIABLE if insn.operand(0) == Some(storage_class::OUTPUT) => {
                output_variables.push(insn);
            }
            op::STORE => stores.push(insn),
            _ => {}
        }
    }

    if !has_vertex_entry_point {
        return Ok(VertexTraceOutcome::NotAVertexStage);
    }

    for var in &output_variables {
        // Block case: the variable whose pointee is the decorated struct is
        // the real store target.
        if let Some(pointer_type) = definitions.get(&var.type_id()) {
            if pointer_type.opcode() == op::TYPE_POINTER
                && pointer_type.operand(1) == Some(position_target)
            {
                position_target = var.result_id();
            }
        }
        // Location decorations on outputs must not count as inputs.
        input_locations.remove(&var.result_id());
    }

    let mut locations = BTreeSet::new();
    // Replayed in stream order so that each position store only sees the
    // stores that textually precede it; a re-stored local resolves to the
    // latest of those.
    let mut store_map: HashMap<u32, u32> = HashMap::new();

    for store in &stores {
        let (Some(pointer), Some(object)) = (store.operand(0), store.operand(1)) else {
            continue;
        };
        store_map.insert(pointer, object);

        if pointer != position_target {
            // A block member write goes through an access chain on the block
            // variable.
            let chain = definitions.get(&pointer);
            let is_position_chain = chain.is_some_and(|chain| {
                chain.opcode() == op::ACCESS_CHAIN && chain.operand(0) == Some(position_target)
            });
            if !is_position_chain {
                continue;
            }
        }

        search(
            object,
            &definitions,
            &input_locations,
            &store_map,
            &mut locations,
            0,
        );
    }

    Ok(VertexTraceOutcome::InputLocations(locations))
}

/// Walks backward from one value, collecting the input locations it was
/// computed from. Pure pass-throughs loop; value-combining instructions
/// recurse into each contributing operand.
fn search(
    id: u32,
    definitions: &HashMap<u32, Instruction<'_>>,
    input_locations: &HashMap<u32, u32>,
    store_map: &HashMap<u32, u32>,
    locations: &mut BTreeSet<u32>,
    depth: usize,
) {
    if depth > MAX_SEARCH_DEPTH {
        warn!("value walk exceeded recursion cap, dropping");
        return;
    }

    let mut current = definitions.get(&id);
    let mut steps = 0;

    while let Some(insn) = current {
        steps += 1;
        if steps > MAX_SEARCH_STEPS {
            warn!(at = insn.at(), "value walk exceeded step cap, dropping");
            return;
        }

        match insn.opcode() {
            op::LOAD => {
                let Some(pointer) = insn.operand(0) else { return };
                if let Some(&location) = input_locations.get(&pointer) {
                    locations.insert(location);
                    return;
                }
                // A load of a local resolves to the value stored into it.
                match store_map.get(&pointer) {
                    Some(object) => current = definitions.get(object),
                    None => return,
                }
            }
            op::COMPOSITE_EXTRACT => {
                current = insn.operand(0).and_then(|id| definitions.get(&id));
            }
            // Both operands of a product can carry attribute data (a matrix
            // loaded from an input is legal, if unusual).
            op::VECTOR_TIMES_SCALAR
            | op::MATRIX_TIMES_SCALAR
            | op::VECTOR_TIMES_MATRIX
            | op::MATRIX_TIMES_VECTOR
            | op::MATRIX_TIMES_MATRIX => {
                for i in 0..2 {
                    if let Some(operand) = insn.operand(i) {
                        search(
                            operand,
                            definitions,
                            input_locations,
                            store_map,
                            locations,
                            depth + 1,
                        );
                    }
                }
                return;
            }
            op::COMPOSITE_CONSTRUCT => {
                for i in 0..insn.num_operands() {
                    if let Some(constituent) = insn.operand(i) {
                        search(
                            constituent,
                            definitions,
                            input_locations,
                            store_map,
                            locations,
                            depth + 1,
                        );
                    }
                }
                return;
            }
            op::CONSTANT | op::CONSTANT_NULL => return,
            other => {
                warn!(
                    opcode = other,
                    at = insn.at(),
                    "unsupported instruction while walking a position value, dropping"
                );
                return;
            }
        }
    }
}
