//! End-to-end analysis tests over synthetic modules.

use pretty_assertions::assert_eq;
use spv_bda::{analyze, AnalyzeError, BindingIdentity, ProvenanceKey};
use spv_words::spv::{
    addressing_model, capability, decoration, memory_model, op, storage_class,
};
use spv_words::test_utils::ModuleBuilder;

fn key(identity: BindingIdentity, byte_offset: u32, array_stride: u32) -> ProvenanceKey {
    ProvenanceKey {
        identity,
        byte_offset,
        array_stride,
    }
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

/// Starts a module that uses buffer device addressing.
fn bda_builder() -> ModuleBuilder {
    let mut b = ModuleBuilder::new();
    b.capability(capability::SHADER);
    b.capability(capability::PHYSICAL_STORAGE_BUFFER_ADDRESSES);
    b.memory_model(
        addressing_model::PHYSICAL_STORAGE_BUFFER64,
        memory_model::GLSL450,
    );
    b
}

/// Declares a forward-referenced physical-storage-buffer pointer type (the
/// shape `buffer_reference` codegen emits) and returns its id.
fn psb_pointer_type(b: &mut ModuleBuilder, pointee_member: u32) -> u32 {
    let ptr = b.fresh_id();
    let block = b.fresh_id();
    b.type_forward_pointer(ptr, storage_class::PHYSICAL_STORAGE_BUFFER);
    b.raw(op::TYPE_STRUCT, &[block, pointee_member]);
    b.raw(
        op::TYPE_POINTER,
        &[ptr, storage_class::PHYSICAL_STORAGE_BUFFER, block],
    );
    ptr
}

/// One storage buffer at set 0 binding 1: `Params { DataRef ptr; }`, and a
/// function that loads the reference through an access chain.
fn single_binding_module() -> Vec<u32> {
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);

    let params = b.type_struct(&[ptr_psb]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    let var = b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    b.name(var, "params");
    b.member_name(params, 0, "ptr");
    b.decorate(var, decoration::DESCRIPTOR_SET, &[0]);
    b.decorate(var, decoration::BINDING, &[1]);

    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_member = b.type_pointer(storage_class::STORAGE_BUFFER, ptr_psb);

    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let chain = b.access_chain(ptr_member, var, &[c0]);
    b.load(ptr_psb, chain);
    b.function_end();
    b.finish()
}

#[test]
fn end_to_end_single_binding() {
    let map = analyze(&single_binding_module()).unwrap();
    assert_eq!(map.len(), 1);
    let expected = key(BindingIdentity::DescriptorBinding { set: 0, binding: 1 }, 0, 0);
    // The backward trace's two-segment path replaces the declaration sweep's
    // single-segment one under the same key.
    assert_eq!(map.get(&expected).unwrap(), &path(&["params", "ptr"]));
}

#[test]
fn analysis_is_deterministic() {
    let module = single_binding_module();
    assert_eq!(analyze(&module).unwrap(), analyze(&module).unwrap());
}

#[test]
fn missing_capability_short_circuits() {
    // Same shape, but no PhysicalStorageBufferAddresses capability.
    let mut b = ModuleBuilder::new();
    b.capability(capability::SHADER);
    b.memory_model(addressing_model::LOGICAL, memory_model::GLSL450);
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);
    let params = b.type_struct(&[ptr_psb]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    let var = b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_member = b.type_pointer(storage_class::STORAGE_BUFFER, ptr_psb);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let chain = b.access_chain(ptr_member, var, &[c0]);
    b.load(ptr_psb, chain);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    assert!(map.is_empty());
}

#[test]
fn duplicate_traces_collapse() {
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);
    let params = b.type_struct(&[ptr_psb]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    let var = b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    b.name(var, "params");
    b.member_name(params, 0, "ptr");
    b.decorate(var, decoration::DESCRIPTOR_SET, &[0]);
    b.decorate(var, decoration::BINDING, &[0]);
    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_member = b.type_pointer(storage_class::STORAGE_BUFFER, ptr_psb);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let chain_a = b.access_chain(ptr_member, var, &[c0]);
    b.load(ptr_psb, chain_a);
    let chain_b = b.access_chain(ptr_member, var, &[c0]);
    b.load(ptr_psb, chain_b);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    assert_eq!(map.len(), 1);
}

#[test]
fn function_local_passthrough_resolves_to_the_same_entry() {
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);
    let params = b.type_struct(&[ptr_psb]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    let var = b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    b.name(var, "params");
    b.member_name(params, 0, "ptr");
    b.decorate(var, decoration::DESCRIPTOR_SET, &[0]);
    b.decorate(var, decoration::BINDING, &[2]);
    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_member = b.type_pointer(storage_class::STORAGE_BUFFER, ptr_psb);
    let ptr_local = b.type_pointer(storage_class::FUNCTION, ptr_psb);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let local = b.variable(ptr_local, storage_class::FUNCTION);
    let chain = b.access_chain(ptr_member, var, &[c0]);
    let direct = b.load(ptr_psb, chain);
    b.store(local, direct);
    // Re-load through the local and dereference again: no spurious new root.
    b.load(ptr_psb, local);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    assert_eq!(map.len(), 1);
    let expected = key(BindingIdentity::DescriptorBinding { set: 0, binding: 2 }, 0, 0);
    assert_eq!(map.get(&expected).unwrap(), &path(&["params", "ptr"]));
}

#[test]
fn push_constant_root_classifies_without_decorations() {
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);
    let pc = b.type_struct(&[ptr_psb]);
    b.name(pc, "PushData");
    b.member_name(pc, 0, "addr");
    let ptr_pc = b.type_pointer(storage_class::PUSH_CONSTANT, pc);
    let var = b.variable(ptr_pc, storage_class::PUSH_CONSTANT);
    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_member = b.type_pointer(storage_class::PUSH_CONSTANT, ptr_psb);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let chain = b.access_chain(ptr_member, var, &[c0]);
    b.load(ptr_psb, chain);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    assert_eq!(map.len(), 1);
    let expected = key(BindingIdentity::PushConstantBlock, 0, 0);
    // The block variable is anonymous, so the root segment is the
    // parenthesized type name.
    assert_eq!(map.get(&expected).unwrap(), &path(&["(PushData)", "addr"]));
}

#[test]
fn offsets_sum_preceding_siblings() {
    // Params { f32 a; vec4 b; DataRef ptr; } — tracing member 2 lands at 20.
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);
    let f32_ty = b.type_float(32);
    let vec4_ty = b.type_vector(f32_ty, 4);
    let params = b.type_struct(&[f32_ty, vec4_ty, ptr_psb]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    let var = b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    b.name(var, "params");
    b.member_name(params, 0, "a");
    b.member_name(params, 1, "b");
    b.member_name(params, 2, "ptr");
    b.decorate(var, decoration::DESCRIPTOR_SET, &[0]);
    b.decorate(var, decoration::BINDING, &[0]);
    let u32_ty = b.type_int(32, false);
    let c2 = b.constant_u32(u32_ty, 2);
    let ptr_member = b.type_pointer(storage_class::STORAGE_BUFFER, ptr_psb);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let chain = b.access_chain(ptr_member, var, &[c2]);
    b.load(ptr_psb, chain);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    let expected = key(BindingIdentity::DescriptorBinding { set: 0, binding: 0 }, 20, 0);
    assert_eq!(map.get(&expected).unwrap(), &path(&["params", "ptr"]));
}

#[test]
fn runtime_array_of_addresses_reports_stride() {
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);
    let run = b.type_runtime_array(ptr_psb);
    b.decorate(run, decoration::ARRAY_STRIDE, &[16]);
    let buf = b.type_struct(&[run]);
    let ptr_buf = b.type_pointer(storage_class::STORAGE_BUFFER, buf);
    let var = b.variable(ptr_buf, storage_class::STORAGE_BUFFER);
    b.name(var, "buf");
    b.member_name(buf, 0, "addrs");
    b.decorate(var, decoration::DESCRIPTOR_SET, &[1]);
    b.decorate(var, decoration::BINDING, &[0]);
    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_member = b.type_pointer(storage_class::STORAGE_BUFFER, run);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let chain = b.access_chain(ptr_member, var, &[c0]);
    b.load(ptr_psb, chain);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    assert_eq!(map.len(), 1);
    let expected = key(BindingIdentity::DescriptorBinding { set: 1, binding: 0 }, 0, 16);
    assert_eq!(map.get(&expected).unwrap(), &path(&["buf", "addrs"]));
}

#[test]
fn declaration_sweep_finds_unused_addresses() {
    // No function body at all: the address member is found purely from the
    // declared layout.
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let ptr_psb = psb_pointer_type(&mut b, u64_ty);
    let f32_ty = b.type_float(32);
    let params = b.type_struct(&[f32_ty, ptr_psb]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    let var = b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    b.name(var, "params");
    b.member_name(params, 0, "scale");
    b.member_name(params, 1, "ptr");
    b.decorate(var, decoration::DESCRIPTOR_SET, &[3]);
    b.decorate(var, decoration::BINDING, &[4]);

    let map = analyze(&b.finish()).unwrap();
    assert_eq!(map.len(), 1);
    let expected = key(BindingIdentity::DescriptorBinding { set: 3, binding: 4 }, 4, 0);
    assert_eq!(map.get(&expected).unwrap(), &path(&["ptr"]));
}

#[test]
fn unsupported_trace_is_dropped_not_fatal() {
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let params = b.type_struct(&[u64_ty]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_u64 = b.type_pointer(storage_class::STORAGE_BUFFER, u64_ty);
    let ptr_psb = b.type_pointer(storage_class::PHYSICAL_STORAGE_BUFFER, u64_ty);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    // An access chain rooted at an OpUndef value: the trace hits an opcode it
    // cannot walk through and gives up on this path only.
    let undef = b.fresh_id();
    b.raw(op::UNDEF, &[ptr_u64, undef]);
    let chain = b.access_chain(ptr_u64, undef, &[c0]);
    b.load(ptr_psb, chain);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    assert!(map.is_empty());
}

#[test]
fn dynamic_indices_are_omitted_not_fatal() {
    let mut b = bda_builder();
    let u64_ty = b.type_int(64, false);
    let params = b.type_struct(&[u64_ty]);
    let ptr_params = b.type_pointer(storage_class::STORAGE_BUFFER, params);
    let var = b.variable(ptr_params, storage_class::STORAGE_BUFFER);
    b.name(var, "params");
    b.member_name(params, 0, "addr");
    b.decorate(var, decoration::DESCRIPTOR_SET, &[0]);
    b.decorate(var, decoration::BINDING, &[0]);
    let u32_ty = b.type_int(32, false);
    let c0 = b.constant_u32(u32_ty, 0);
    let ptr_u64 = b.type_pointer(storage_class::STORAGE_BUFFER, u64_ty);
    let ptr_psb = b.type_pointer(storage_class::PHYSICAL_STORAGE_BUFFER, u64_ty);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    // Second index is an undefined (non-constant) value; it is dropped while
    // the constant first index still resolves.
    let undef_index = b.fresh_id();
    b.raw(op::UNDEF, &[u32_ty, undef_index]);
    let chain = b.access_chain(ptr_u64, var, &[c0, undef_index]);
    b.load(ptr_psb, chain);
    b.function_end();

    let map = analyze(&b.finish()).unwrap();
    assert_eq!(map.len(), 1);
    let expected = key(BindingIdentity::DescriptorBinding { set: 0, binding: 0 }, 0, 0);
    assert_eq!(map.get(&expected).unwrap(), &path(&["params", "addr"]));
}

#[test]
fn load_header_too_short_for_its_ids_is_fatal() {
    // An OpLoad whose declared length cannot hold its type and result ids.
    let b = bda_builder();
    let mut module = b.finish();
    module.push((2 << 16) | u32::from(op::LOAD));
    module.push(7);

    match analyze(&module) {
        Err(AnalyzeError::Malformed(_)) => {}
        other => panic!("expected a malformed-module error, got {other:?}"),
    }
}

#[test]
fn malformed_stream_is_fatal() {
    let mut module = single_binding_module();
    // Stretch the final instruction's declared length past the buffer end.
    let last_header = module.len() - 1;
    module[last_header] = (9 << 16) | u32::from(op::FUNCTION_END);

    match analyze(&module) {
        Err(AnalyzeError::Malformed(_)) => {}
        other => panic!("expected a malformed-module error, got {other:?}"),
    }
}
