//! The slice of the SPIR-V enumerant space used by the analyzers.
//!
//! Only the enumerants the workspace actually consults are named here; raw
//! values are kept as plain integers (the way the encoding stores them) so
//! unknown enumerants flow through untouched instead of failing to decode.

/// Instruction opcodes (the low 16 bits of an instruction's first word).
pub mod op {
    /// `OpUndef`
    pub const UNDEF: u16 = 1;
    /// `OpName`
    pub const NAME: u16 = 5;
    /// `OpMemberName`
    pub const MEMBER_NAME: u16 = 6;
    /// `OpString`
    pub const STRING: u16 = 7;
    /// `OpExtInstImport`
    pub const EXT_INST_IMPORT: u16 = 11;
    /// `OpExtInst`
    pub const EXT_INST: u16 = 12;
    /// `OpMemoryModel`
    pub const MEMORY_MODEL: u16 = 14;
    /// `OpEntryPoint`
    pub const ENTRY_POINT: u16 = 15;
    /// `OpExecutionMode`
    pub const EXECUTION_MODE: u16 = 16;
    /// `OpCapability`
    pub const CAPABILITY: u16 = 17;

    /// `OpTypeVoid`
    pub const TYPE_VOID: u16 = 19;
    /// `OpTypeBool`
    pub const TYPE_BOOL: u16 = 20;
    /// `OpTypeInt`
    pub const TYPE_INT: u16 = 21;
    /// `OpTypeFloat`
    pub const TYPE_FLOAT: u16 = 22;
    /// `OpTypeVector`
    pub const TYPE_VECTOR: u16 = 23;
    /// `OpTypeMatrix`
    pub const TYPE_MATRIX: u16 = 24;
    /// `OpTypeImage`
    pub const TYPE_IMAGE: u16 = 25;
    /// `OpTypeSampler`
    pub const TYPE_SAMPLER: u16 = 26;
    /// `OpTypeSampledImage`
    pub const TYPE_SAMPLED_IMAGE: u16 = 27;
    /// `OpTypeArray`
    pub const TYPE_ARRAY: u16 = 28;
    /// `OpTypeRuntimeArray`
    pub const TYPE_RUNTIME_ARRAY: u16 = 29;
    /// `OpTypeStruct`
    pub const TYPE_STRUCT: u16 = 30;
    /// `OpTypePointer`
    pub const TYPE_POINTER: u16 = 32;
    /// `OpTypeFunction`
    pub const TYPE_FUNCTION: u16 = 33;
    /// `OpTypeForwardPointer`
    pub const TYPE_FORWARD_POINTER: u16 = 39;

    /// `OpConstantTrue`
    pub const CONSTANT_TRUE: u16 = 41;
    /// `OpConstantFalse`
    pub const CONSTANT_FALSE: u16 = 42;
    /// `OpConstant`
    pub const CONSTANT: u16 = 43;
    /// `OpConstantComposite`
    pub const CONSTANT_COMPOSITE: u16 = 44;
    /// `OpConstantNull`
    pub const CONSTANT_NULL: u16 = 46;

    /// `OpFunction`
    pub const FUNCTION: u16 = 54;
    /// `OpFunctionParameter`
    pub const FUNCTION_PARAMETER: u16 = 55;
    /// `OpFunctionEnd`
    pub const FUNCTION_END: u16 = 56;
    /// `OpFunctionCall`
    pub const FUNCTION_CALL: u16 = 57;

    /// `OpVariable`
    pub const VARIABLE: u16 = 59;
    /// `OpLoad`
    pub const LOAD: u16 = 61;
    /// `OpStore`
    pub const STORE: u16 = 62;
    /// `OpAccessChain`
    pub const ACCESS_CHAIN: u16 = 65;
    /// `OpInBoundsAccessChain`
    pub const IN_BOUNDS_ACCESS_CHAIN: u16 = 66;

    /// `OpDecorate`
    pub const DECORATE: u16 = 71;
    /// `OpMemberDecorate`
    pub const MEMBER_DECORATE: u16 = 72;
    /// `OpDecorationGroup`
    pub const DECORATION_GROUP: u16 = 73;

    /// `OpVectorShuffle`
    pub const VECTOR_SHUFFLE: u16 = 79;
    /// `OpCompositeConstruct`
    pub const COMPOSITE_CONSTRUCT: u16 = 80;
    /// `OpCompositeExtract`
    pub const COMPOSITE_EXTRACT: u16 = 81;
    /// `OpCopyObject`
    pub const COPY_OBJECT: u16 = 83;

    /// `OpConvertPtrToU`
    pub const CONVERT_PTR_TO_U: u16 = 117;
    /// `OpConvertUToPtr`
    pub const CONVERT_U_TO_PTR: u16 = 120;
    /// `OpBitcast`
    pub const BITCAST: u16 = 124;

    /// `OpVectorTimesScalar`
    pub const VECTOR_TIMES_SCALAR: u16 = 142;
    /// `OpMatrixTimesScalar`
    pub const MATRIX_TIMES_SCALAR: u16 = 143;
    /// `OpVectorTimesMatrix`
    pub const VECTOR_TIMES_MATRIX: u16 = 144;
    /// `OpMatrixTimesVector`
    pub const MATRIX_TIMES_VECTOR: u16 = 145;
    /// `OpMatrixTimesMatrix`
    pub const MATRIX_TIMES_MATRIX: u16 = 146;

    /// `OpPhi`
    pub const PHI: u16 = 245;
    /// `OpLabel`
    pub const LABEL: u16 = 248;
    /// `OpBranch`
    pub const BRANCH: u16 = 249;
    /// `OpReturn`
    pub const RETURN: u16 = 253;

    /// `OpCopyLogical` (SPIR-V 1.4)
    pub const COPY_LOGICAL: u16 = 400;

    /// Returns `(has_result_id, has_type_id)` for `opcode`.
    ///
    /// This mirrors the fixed opcode property tables of the SPIR-V grammar for
    /// the portion of the instruction set that shows up in shader modules.
    /// Unknown opcodes are classified as carrying neither; an instruction so
    /// classified simply never lands in the definition index, and any backward
    /// trace that reaches it terminates as unresolvable rather than reading a
    /// misplaced id.
    pub fn has_result_and_type(opcode: u16) -> (bool, bool) {
        match opcode {
            // Debug / annotation / mode-setting instructions: no result, no type.
            0 | 2..=4 | NAME | MEMBER_NAME | 8 | 10 | MEMORY_MODEL | ENTRY_POINT
            | EXECUTION_MODE | CAPABILITY => (false, false),
            STRING | EXT_INST_IMPORT => (true, false),
            UNDEF | EXT_INST => (true, true),

            // Type declarations produce a result but have no type of their own.
            // OpTypeForwardPointer names an existing id instead of producing one.
            19..=38 => (true, false),
            TYPE_FORWARD_POINTER => (false, false),

            // Constants and spec constants.
            41..=46 | 48..=52 => (true, true),

            FUNCTION | FUNCTION_PARAMETER | FUNCTION_CALL => (true, true),
            FUNCTION_END => (false, false),

            // Memory instructions.
            VARIABLE | 60 | LOAD => (true, true),
            STORE | 63 | 64 => (false, false),
            ACCESS_CHAIN | IN_BOUNDS_ACCESS_CHAIN | 67..=70 => (true, true),

            // Decorations.
            DECORATE | MEMBER_DECORATE | 74 | 75 => (false, false),
            DECORATION_GROUP => (true, false),

            // Composite / image / conversion / arithmetic / relational / bit
            // instructions are uniformly <type> <result> ..., with the few
            // typeless exceptions called out explicitly.
            77..=98 | 100..=107 => (true, true),
            99 => (false, false), // OpImageWrite

            109..=124 => (true, true),
            126..=152 => (true, true),
            154..=191 => (true, true),
            194..=205 => (true, true),
            207..=210 => (true, true),

            // Atomics: OpAtomicStore has no result, the rest do.
            227 | 229..=240 => (true, true),
            228 => (false, false),

            // Structured control flow.
            PHI => (true, true),
            246 | 247 => (false, false),
            LABEL => (true, false),
            BRANCH | 250..=255 => (false, false),

            COPY_LOGICAL => (true, true),

            _ => (false, false),
        }
    }
}

/// Storage classes (the first operand of `OpVariable` and `OpTypePointer`).
pub mod storage_class {
    /// `UniformConstant`
    pub const UNIFORM_CONSTANT: u32 = 0;
    /// `Input`
    pub const INPUT: u32 = 1;
    /// `Uniform`
    pub const UNIFORM: u32 = 2;
    /// `Output`
    pub const OUTPUT: u32 = 3;
    /// `Private`
    pub const PRIVATE: u32 = 6;
    /// `Function`
    pub const FUNCTION: u32 = 7;
    /// `PushConstant`
    pub const PUSH_CONSTANT: u32 = 9;
    /// `StorageBuffer`
    pub const STORAGE_BUFFER: u32 = 12;
    /// `ShaderRecordBufferKHR`
    pub const SHADER_RECORD_BUFFER_KHR: u32 = 5343;
    /// `PhysicalStorageBuffer`
    pub const PHYSICAL_STORAGE_BUFFER: u32 = 5349;
}

/// Decorations (the second operand of `OpDecorate`).
pub mod decoration {
    /// `Block`
    pub const BLOCK: u32 = 2;
    /// `ArrayStride`
    pub const ARRAY_STRIDE: u32 = 6;
    /// `MatrixStride`
    pub const MATRIX_STRIDE: u32 = 7;
    /// `BuiltIn`
    pub const BUILT_IN: u32 = 11;
    /// `Location`
    pub const LOCATION: u32 = 30;
    /// `Binding`
    pub const BINDING: u32 = 33;
    /// `DescriptorSet`
    pub const DESCRIPTOR_SET: u32 = 34;
    /// `Offset`
    pub const OFFSET: u32 = 35;
}

/// Capabilities (the operand of `OpCapability`).
pub mod capability {
    /// `Shader`
    pub const SHADER: u32 = 1;
    /// `PhysicalStorageBufferAddresses`
    pub const PHYSICAL_STORAGE_BUFFER_ADDRESSES: u32 = 5347;
}

/// Execution models (the first operand of `OpEntryPoint`).
pub mod execution_model {
    /// `Vertex`
    pub const VERTEX: u32 = 0;
    /// `Fragment`
    pub const FRAGMENT: u32 = 4;
    /// `GLCompute`
    pub const GL_COMPUTE: u32 = 5;
}

/// Built-in variable kinds (the operand of a `BuiltIn` decoration).
pub mod built_in {
    /// `Position`
    pub const POSITION: u32 = 0;
}

/// Addressing models (the first operand of `OpMemoryModel`).
pub mod addressing_model {
    /// `Logical`
    pub const LOGICAL: u32 = 0;
    /// `PhysicalStorageBuffer64`
    pub const PHYSICAL_STORAGE_BUFFER64: u32 = 5348;
}

/// Memory models (the second operand of `OpMemoryModel`).
pub mod memory_model {
    /// `GLSL450`
    pub const GLSL450: u32 = 1;
}
