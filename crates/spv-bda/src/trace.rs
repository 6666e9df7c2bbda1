use spv_reflect::{ModuleReflection, ReflectedType};
use spv_words::spv::{op, storage_class};
use spv_words::Instruction;
use tracing::warn;

use crate::index::ModuleIndex;
use crate::layout::compute_path_offset;
use crate::provenance::{BindingIdentity, ProvenanceKey, ProvenanceMap};

// Trace walks are linear in well-formed SSA, but hostile input can tie the
// def-use graph into a knot; cap the walk instead of trusting it.
const MAX_TRACE_STEPS: usize = 256;
const MAX_CONSTANT_CHAIN: usize = 64;

/// The backward tracer: walks the def-use graph from a dereference site back
/// to its root storage location.
///
/// State across transitions is explicit: the instruction currently being
/// resolved and the accumulated access-chain indices, outermost-first.
pub(crate) struct Tracer<'w, 'r> {
    pub index: &'r ModuleIndex<'w>,
    pub reflection: &'r ModuleReflection,
}

impl<'w> Tracer<'w, '_> {
    /// Runs one backward trace from `start`, merging at most one provenance
    /// entry into `map`. Every failure mode here is per-trace: log and drop.
    pub(crate) fn trace(&self, start: Instruction<'w>, map: &mut ProvenanceMap) {
        let mut current = Some(start);
        let mut indices: Vec<u32> = Vec::new();
        let mut steps = 0;

        while let Some(insn) = current {
            steps += 1;
            if steps > MAX_TRACE_STEPS {
                warn!(at = insn.at(), "trace exceeded step cap, dropping");
                return;
            }

            match insn.opcode() {
                // Pure pass-throughs: the value is whatever produced the
                // single source operand.
                op::CONVERT_U_TO_PTR | op::COPY_LOGICAL | op::LOAD => {
                    current = insn.operand(0).and_then(|id| self.index.definition(id));
                }

                op::ACCESS_CHAIN | op::IN_BOUNDS_ACCESS_CHAIN => {
                    let mut step_indices = Vec::new();
                    for i in 1..insn.num_operands() {
                        let Some(id) = insn.operand(i) else { continue };
                        if let Some(value) = self.resolve_constant_index(id) {
                            step_indices.push(value);
                        }
                        // Indices computed by arbitrary expressions are
                        // omitted rather than failing the path: a known
                        // precision limitation.
                    }
                    // Prepend: the earliest-encountered chain is the
                    // outermost structural nesting.
                    indices.splice(0..0, step_indices);
                    current = insn.operand(0).and_then(|id| self.index.definition(id));
                }

                op::VARIABLE => {
                    if insn.operand(0) == Some(storage_class::FUNCTION) {
                        // A cast through a struct copy lands in a second
                        // function variable; keep following its stored value.
                        current = self.index.find_variable_storing(insn.result_id());
                    } else {
                        self.resolve_root(insn, &indices, map);
                        return;
                    }
                }

                other => {
                    warn!(
                        opcode = other,
                        at = insn.at(),
                        "unsupported opcode while tracing a buffer address, dropping"
                    );
                    return;
                }
            }
        }
    }

    /// Resolves an access-chain index operand to a constant value.
    ///
    /// Only a direct `OpConstant`, or a load-of-a-local whose first store was
    /// a constant, resolves; anything else yields `None`.
    fn resolve_constant_index(&self, id: u32) -> Option<u32> {
        let mut insn = self.index.definition(id)?;
        for _ in 0..MAX_CONSTANT_CHAIN {
            match insn.opcode() {
                op::CONSTANT => return insn.operand(0),
                op::LOAD => {
                    let pointer = self.index.definition(insn.operand(0)?)?;
                    if pointer.opcode() != op::VARIABLE {
                        return None;
                    }
                    insn = self.index.find_variable_storing(pointer.result_id())?;
                }
                _ => return None,
            }
        }
        None
    }

    /// Terminal transition: classify a non-function variable into a binding
    /// identity, resolve the accumulated indices against its reflected
    /// layout, and insert the provenance entry.
    fn resolve_root(&self, variable: Instruction<'w>, indices: &[u32], map: &mut ProvenanceMap) {
        let variable_id = variable.result_id();
        let storage = variable.operand(0).unwrap_or(u32::MAX);

        let (identity, root_name, root_ty): (BindingIdentity, String, &ReflectedType) =
            match storage {
                storage_class::PUSH_CONSTANT => {
                    let Some(block) = self.reflection.push_constant_type() else {
                        warn!(variable = variable_id, "no push-constant block reflected");
                        return;
                    };
                    (
                        BindingIdentity::PushConstantBlock,
                        root_segment(block.name.as_deref(), &block.ty),
                        &block.ty,
                    )
                }
                storage_class::UNIFORM
                | storage_class::STORAGE_BUFFER
                | storage_class::SHADER_RECORD_BUFFER_KHR => {
                    let (set, binding) = self.index.descriptor_slot(variable_id);
                    let Some(reflected) = self.reflection.binding_type(set, binding) else {
                        warn!(set, binding, "no reflected type for descriptor binding");
                        return;
                    };
                    (
                        BindingIdentity::DescriptorBinding { set, binding },
                        root_segment(reflected.name.as_deref(), &reflected.ty),
                        &reflected.ty,
                    )
                }
                other => {
                    warn!(
                        storage_class = other,
                        variable = variable_id,
                        "storage class not handled as a buffer-address root"
                    );
                    return;
                }
            };

        let resolved = match compute_path_offset(root_ty, indices) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(%identity, error = %err, "failed to resolve access-chain path");
                return;
            }
        };

        if !is_address_type(resolved.leaf) {
            warn!(
                %identity,
                leaf_op = resolved.leaf.op,
                "traced a potential buffer address, but the member type does not match"
            );
            return;
        }

        let mut path = Vec::with_capacity(1 + resolved.segments.len());
        path.push(root_name);
        path.extend(resolved.segments);

        map.insert(
            ProvenanceKey {
                identity,
                byte_offset: resolved.offset,
                array_stride: resolved.stride,
            },
            path,
        );
    }
}

/// Buffer addresses trace back to a pointer type, a 64-bit scalar, or a
/// runtime array of either.
fn is_address_type(ty: &ReflectedType) -> bool {
    matches!(
        ty.op,
        op::TYPE_POINTER | op::TYPE_FORWARD_POINTER | op::TYPE_RUNTIME_ARRAY
    ) || (ty.op == op::TYPE_INT && ty.numeric.scalar_width == 64)
}

fn root_segment(name: Option<&str>, ty: &ReflectedType) -> String {
    match name {
        Some(name) => name.to_string(),
        // Push-constant blocks and anonymous uniform blocks fall back to the
        // type name.
        None => ty
            .type_name
            .as_ref()
            .map(|t| format!("({t})"))
            .unwrap_or_default(),
    }
}
