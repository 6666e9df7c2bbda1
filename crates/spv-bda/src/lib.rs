//! Static provenance analysis for buffer device addresses in SPIR-V modules.
//!
//! For every 64-bit physical-storage-buffer address a shader dereferences,
//! [`analyze`] determines where the address ultimately originates: which
//! descriptor binding (set/binding) or push-constant block, at what byte
//! offset within that block's declared layout, and through which chain of
//! member names. Addresses are typically loaded from a local copy, threaded
//! through casts and struct copies, and indexed through nested aggregates
//! before being dereferenced, so the analysis reconstructs the module's
//! def-use graph and walks it backward from each dereference site.
//!
//! Two independent sources feed the result map:
//!
//! - a declaration sweep over every reflected binding's type tree, which
//!   finds address-typed members that are never explicitly dereferenced, and
//! - one backward trace per load of a physical-storage-buffer pointer.
//!
//! Both merge into one deduplicating [`ProvenanceMap`].

#![forbid(unsafe_code)]

mod error;
mod index;
mod layout;
mod provenance;
mod trace;

use spv_words::spv::{op, storage_class};
use spv_words::RawModule;
use tracing::debug;

use crate::index::{IndexOutcome, ModuleIndex};
use crate::layout::scan_for_buffer_references;
use crate::trace::Tracer;

pub use crate::error::AnalyzeError;
pub use crate::provenance::{BindingIdentity, MemberPath, ProvenanceKey, ProvenanceMap};
pub use spv_reflect::ModuleReflection;

/// Analyzes one module and returns the buffer-address provenance map.
///
/// A module that never declares the `PhysicalStorageBufferAddresses`
/// capability before its first function body short-circuits to an empty map.
/// Malformed word streams are the only fatal failure; unresolvable individual
/// traces are logged and dropped.
pub fn analyze(words: &[u32]) -> Result<ProvenanceMap, AnalyzeError> {
    let module = RawModule::new(words)?;

    let index = match ModuleIndex::build(&module)? {
        IndexOutcome::Analyzable(index) => index,
        IndexOutcome::NoBufferAddressing => {
            debug!("module does not use buffer device addressing");
            return Ok(ProvenanceMap::default());
        }
    };

    let reflection = ModuleReflection::parse(words)?;
    let mut map = ProvenanceMap::default();

    // Static declaration sweep: addresses embedded in binding layouts, with
    // or without a use site.
    for binding in reflection.bindings() {
        scan_for_buffer_references(
            &binding.ty,
            BindingIdentity::DescriptorBinding {
                set: binding.set,
                binding: binding.binding,
            },
            &mut map,
        );
    }
    for block in reflection.push_constant_blocks() {
        scan_for_buffer_references(&block.ty, BindingIdentity::PushConstantBlock, &mut map);
    }

    // Dynamic traces: one per load of a physical-storage-buffer pointer.
    let tracer = Tracer {
        index: &index,
        reflection: &reflection,
    };
    for load in index.loads() {
        // The dereference is always done through a load whose result type is
        // a pointer into the physical storage buffer class.
        let Some(result_type) = index.definition(load.type_id()) else {
            continue;
        };
        if result_type.opcode() != op::TYPE_POINTER
            || result_type.operand(0) != Some(storage_class::PHYSICAL_STORAGE_BUFFER)
        {
            continue;
        }
        let Some(pointer) = load.operand(0).and_then(|id| index.definition(id)) else {
            continue;
        };

        if pointer.opcode() == op::VARIABLE
            && pointer.operand(0) == Some(storage_class::FUNCTION)
        {
            // The pointer lives in a function-local; start from the value its
            // first store put there.
            if let Some(object) = index.find_variable_storing(pointer.result_id()) {
                tracer.trace(object, &mut map);
            }
        } else if matches!(
            pointer.opcode(),
            op::ACCESS_CHAIN | op::IN_BOUNDS_ACCESS_CHAIN
        ) {
            tracer.trace(pointer, &mut map);
        }
    }

    Ok(map)
}
