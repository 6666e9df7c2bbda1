use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use spv_words::spv::{
    addressing_model, built_in, capability, decoration, execution_model, memory_model, op,
    storage_class,
};
use spv_words::test_utils::ModuleBuilder;

fn write_module(words: &[u32]) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().expect("tempfile");
    for word in words {
        tmp.write_all(&word.to_le_bytes()).unwrap();
    }
    tmp
}

fn spv_scan() -> Command {
    Command::new(env!("CARGO_BIN_EXE_spv-scan"))
}

/// One storage buffer at set 0 binding 1 whose member 0 is a buffer
/// reference, dereferenced once through an access chain.
fn bda_module() -> Vec<u32> {
    let mut b = ModuleBuilder::new();
    b.capability(capability::SHADER);
    b.capability(capability::PHYSICAL_STORAGE_BUFFER_ADDRESSES);
    b.memory_model(
        addressing_model::PHYSICAL_STORAGE_BUFFER64,
        memory_model::GLSL450,
    );

    let u64_ty = b.type_int(64, false);
    let ptr_psb = b.fresh_id();
    let block = b.fresh_id();
    b.type_forward_pointer(ptr_psb, storage_class::PHYSICAL_STORAGE_BUFFER);
    b.raw(op::TYPE_STRUCT, &[block, u64_ty]);
    b.raw(
        op::TYPE_POINTER,
        &[ptr_psb, storage_class::PHYSICAL_STORAGE_BUFFER, block],
    );

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

fn vertex_module() -> Vec<u32> {
    let mut b = ModuleBuilder::new();
    b.capability(capability::SHADER);
    b.memory_model(addressing_model::LOGICAL, memory_model::GLSL450);
    let main_fn = b.fresh_id();
    b.entry_point(execution_model::VERTEX, main_fn, "main", &[]);

    let f32_ty = b.type_float(32);
    let vec4_ty = b.type_vector(f32_ty, 4);
    let ptr_in = b.type_pointer(storage_class::INPUT, vec4_ty);
    let ptr_out = b.type_pointer(storage_class::OUTPUT, vec4_ty);
    let input = b.variable(ptr_in, storage_class::INPUT);
    b.decorate(input, decoration::LOCATION, &[3]);
    let position = b.variable(ptr_out, storage_class::OUTPUT);
    b.decorate(position, decoration::BUILT_IN, &[built_in::POSITION]);

    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    let value = b.load(vec4_ty, input);
    b.store(position, value);
    b.function_end();
    b.finish()
}

#[test]
fn bda_reports_binding_offset_and_path() {
    let tmp = write_module(&bda_module());

    spv_scan()
        .arg("bda")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "buffer-reference: params -> ptr (set: 0, binding: 1, buffer-offset: 0, array-stride: 0)",
        ));
}

#[test]
fn bda_reports_nothing_without_the_capability() {
    let mut b = ModuleBuilder::new();
    b.capability(capability::SHADER);
    b.memory_model(addressing_model::LOGICAL, memory_model::GLSL450);
    let void = b.type_void();
    let fn_ty = b.type_function(void, &[]);
    b.function_begin(void, fn_ty);
    b.function_end();
    let tmp = write_module(&b.finish());

    spv_scan()
        .arg("bda")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no buffer device addresses found"));
}

#[test]
fn vertex_input_reports_location() {
    let tmp = write_module(&vertex_module());

    spv_scan()
        .arg("vertex-input")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Position is fed by input location 3",
        ));
}

#[test]
fn vertex_input_skips_non_vertex_modules() {
    let mut b = ModuleBuilder::new();
    b.capability(capability::SHADER);
    b.memory_model(addressing_model::LOGICAL, memory_model::GLSL450);
    let main_fn = b.fresh_id();
    b.entry_point(execution_model::FRAGMENT, main_fn, "main", &[]);
    let tmp = write_module(&b.finish());

    spv_scan()
        .arg("vertex-input")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("not a vertex shader"));
}

#[test]
fn ragged_file_length_exits_nonzero() {
    let mut tmp = tempfile::NamedTempFile::new().expect("tempfile");
    tmp.write_all(&[0x03, 0x02, 0x23]).unwrap();

    spv_scan()
        .arg("bda")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a whole number of 32-bit words"));
}

#[test]
fn bad_magic_exits_nonzero() {
    let tmp = write_module(&[0xdead_beef, 0, 0, 0, 0]);

    spv_scan()
        .arg("bda")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad magic word"));
}

#[test]
fn truncated_instruction_exits_nonzero() {
    let mut module = bda_module();
    let last = module.len() - 1;
    module[last] = (9 << 16) | u32::from(op::FUNCTION_END);
    let tmp = write_module(&module);

    spv_scan()
        .arg("bda")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("declares 9 words but only 1 remain"));
}
