//! A small builder for synthesizing well-formed SPIR-V modules in tests.
//!
//! The builder only knows the handful of instructions the workspace's
//! analyzers consume; it performs no validation beyond correct word-level
//! encoding, which makes it equally useful for building deliberately odd
//! modules.

use crate::module::{HEADER_WORDS, MAGIC};
use crate::spv::op;

const VERSION_1_5: u32 = 0x0001_0500;

/// Builds a module word stream instruction by instruction.
#[derive(Debug)]
pub struct ModuleBuilder {
    words: Vec<u32>,
    next_id: u32,
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleBuilder {
    /// Starts a module with the standard 5-word header.
    pub fn new() -> Self {
        ModuleBuilder {
            // Magic, version, generator, id bound (patched in `finish`), schema.
            words: vec![MAGIC, VERSION_1_5, 0, 0, 0],
            next_id: 1,
        }
    }

    /// Allocates a fresh result id.
    pub fn fresh_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Emits a raw instruction: `tail` is every word after the header word.
    pub fn raw(&mut self, opcode: u16, tail: &[u32]) {
        let len = (tail.len() + 1) as u32;
        self.words.push((len << 16) | opcode as u32);
        self.words.extend_from_slice(tail);
    }

    fn push_string(tail: &mut Vec<u32>, s: &str) {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        while bytes.len() % 4 != 0 {
            bytes.push(0);
        }
        for chunk in bytes.chunks_exact(4) {
            tail.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
    }

    /// `OpCapability <cap>`
    pub fn capability(&mut self, cap: u32) {
        self.raw(op::CAPABILITY, &[cap]);
    }

    /// `OpMemoryModel <addressing> <memory>`
    pub fn memory_model(&mut self, addressing: u32, memory: u32) {
        self.raw(op::MEMORY_MODEL, &[addressing, memory]);
    }

    /// `OpEntryPoint <model> <function> "<name>" <interface...>`
    pub fn entry_point(&mut self, model: u32, function: u32, name: &str, interface: &[u32]) {
        let mut tail = vec![model, function];
        Self::push_string(&mut tail, name);
        tail.extend_from_slice(interface);
        self.raw(op::ENTRY_POINT, &tail);
    }

    /// `OpName <target> "<name>"`
    pub fn name(&mut self, target: u32, name: &str) {
        let mut tail = vec![target];
        Self::push_string(&mut tail, name);
        self.raw(op::NAME, &tail);
    }

    /// `OpMemberName <ty> <member> "<name>"`
    pub fn member_name(&mut self, ty: u32, member: u32, name: &str) {
        let mut tail = vec![ty, member];
        Self::push_string(&mut tail, name);
        self.raw(op::MEMBER_NAME, &tail);
    }

    /// `OpDecorate <target> <decoration> <extra...>`
    pub fn decorate(&mut self, target: u32, decoration: u32, extra: &[u32]) {
        let mut tail = vec![target, decoration];
        tail.extend_from_slice(extra);
        self.raw(op::DECORATE, &tail);
    }

    /// `OpMemberDecorate <ty> <member> <decoration> <extra...>`
    pub fn member_decorate(&mut self, ty: u32, member: u32, decoration: u32, extra: &[u32]) {
        let mut tail = vec![ty, member, decoration];
        tail.extend_from_slice(extra);
        self.raw(op::MEMBER_DECORATE, &tail);
    }

    /// `%id = OpTypeVoid`
    pub fn type_void(&mut self) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_VOID, &[id]);
        id
    }

    /// `%id = OpTypeInt <width> <signedness>`
    pub fn type_int(&mut self, width: u32, signed: bool) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_INT, &[id, width, signed as u32]);
        id
    }

    /// `%id = OpTypeFloat <width>`
    pub fn type_float(&mut self, width: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_FLOAT, &[id, width]);
        id
    }

    /// `%id = OpTypeVector <component> <count>`
    pub fn type_vector(&mut self, component: u32, count: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_VECTOR, &[id, component, count]);
        id
    }

    /// `%id = OpTypeMatrix <column> <count>`
    pub fn type_matrix(&mut self, column: u32, columns: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_MATRIX, &[id, column, columns]);
        id
    }

    /// `%id = OpTypeStruct <members...>`
    pub fn type_struct(&mut self, members: &[u32]) -> u32 {
        let id = self.fresh_id();
        let mut tail = vec![id];
        tail.extend_from_slice(members);
        self.raw(op::TYPE_STRUCT, &tail);
        id
    }

    /// `%id = OpTypeArray <element> <length-constant>`
    pub fn type_array(&mut self, element: u32, length: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_ARRAY, &[id, element, length]);
        id
    }

    /// `%id = OpTypeRuntimeArray <element>`
    pub fn type_runtime_array(&mut self, element: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_RUNTIME_ARRAY, &[id, element]);
        id
    }

    /// `%id = OpTypePointer <storage-class> <pointee>`
    pub fn type_pointer(&mut self, storage_class: u32, pointee: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::TYPE_POINTER, &[id, storage_class, pointee]);
        id
    }

    /// `OpTypeForwardPointer <pointer-type> <storage-class>`
    pub fn type_forward_pointer(&mut self, pointer_type: u32, storage_class: u32) {
        self.raw(op::TYPE_FORWARD_POINTER, &[pointer_type, storage_class]);
    }

    /// `%id = OpTypeFunction <return> <params...>`
    pub fn type_function(&mut self, return_ty: u32, params: &[u32]) -> u32 {
        let id = self.fresh_id();
        let mut tail = vec![id, return_ty];
        tail.extend_from_slice(params);
        self.raw(op::TYPE_FUNCTION, &tail);
        id
    }

    /// `%id = OpConstant <ty> <value>`
    pub fn constant_u32(&mut self, ty: u32, value: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::CONSTANT, &[ty, id, value]);
        id
    }

    /// `%id = OpVariable <pointer-ty> <storage-class>`
    pub fn variable(&mut self, pointer_ty: u32, storage_class: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::VARIABLE, &[pointer_ty, id, storage_class]);
        id
    }

    /// `%id = OpFunction <return> None <fn-ty>` followed by an `OpLabel`.
    pub fn function_begin(&mut self, return_ty: u32, fn_ty: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::FUNCTION, &[return_ty, id, 0, fn_ty]);
        let label = self.fresh_id();
        self.raw(op::LABEL, &[label]);
        id
    }

    /// `OpReturn` followed by `OpFunctionEnd`.
    pub fn function_end(&mut self) {
        self.raw(op::RETURN, &[]);
        self.raw(op::FUNCTION_END, &[]);
    }

    /// `%id = OpLoad <ty> <pointer>`
    pub fn load(&mut self, ty: u32, pointer: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::LOAD, &[ty, id, pointer]);
        id
    }

    /// `OpStore <pointer> <object>`
    pub fn store(&mut self, pointer: u32, object: u32) {
        self.raw(op::STORE, &[pointer, object]);
    }

    /// `%id = OpAccessChain <ty> <base> <indices...>`
    pub fn access_chain(&mut self, ty: u32, base: u32, indices: &[u32]) -> u32 {
        let id = self.fresh_id();
        let mut tail = vec![ty, id, base];
        tail.extend_from_slice(indices);
        self.raw(op::ACCESS_CHAIN, &tail);
        id
    }

    /// `%id = OpConvertUToPtr <ty> <value>`
    pub fn convert_u_to_ptr(&mut self, ty: u32, value: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::CONVERT_U_TO_PTR, &[ty, id, value]);
        id
    }

    /// `%id = OpCopyObject <ty> <value>`
    pub fn copy_object(&mut self, ty: u32, value: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::COPY_OBJECT, &[ty, id, value]);
        id
    }

    /// `%id = OpCompositeExtract <ty> <composite> <indices...>`
    pub fn composite_extract(&mut self, ty: u32, composite: u32, indices: &[u32]) -> u32 {
        let id = self.fresh_id();
        let mut tail = vec![ty, id, composite];
        tail.extend_from_slice(indices);
        self.raw(op::COMPOSITE_EXTRACT, &tail);
        id
    }

    /// `%id = OpCompositeConstruct <ty> <constituents...>`
    pub fn composite_construct(&mut self, ty: u32, constituents: &[u32]) -> u32 {
        let id = self.fresh_id();
        let mut tail = vec![ty, id];
        tail.extend_from_slice(constituents);
        self.raw(op::COMPOSITE_CONSTRUCT, &tail);
        id
    }

    /// `%id = OpMatrixTimesVector <ty> <matrix> <vector>`
    pub fn matrix_times_vector(&mut self, ty: u32, matrix: u32, vector: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::MATRIX_TIMES_VECTOR, &[ty, id, matrix, vector]);
        id
    }

    /// `%id = OpVectorTimesScalar <ty> <vector> <scalar>`
    pub fn vector_times_scalar(&mut self, ty: u32, vector: u32, scalar: u32) -> u32 {
        let id = self.fresh_id();
        self.raw(op::VECTOR_TIMES_SCALAR, &[ty, id, vector, scalar]);
        id
    }

    /// Finishes the module, patching the header's id bound.
    pub fn finish(mut self) -> Vec<u32> {
        self.words[3] = self.next_id;
        self.words
    }

    /// Number of words emitted so far, header included.
    pub fn word_len(&self) -> usize {
        debug_assert!(self.words.len() >= HEADER_WORDS);
        self.words.len()
    }
}
