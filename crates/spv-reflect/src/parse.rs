use std::collections::{BTreeMap, HashMap};

use spv_words::spv::{decoration, op, storage_class};
use spv_words::{literal_string, Instruction, RawModule};
use tracing::warn;

use crate::error::ReflectError;
use crate::types::{ArrayTraits, NumericTraits, ReflectedType};

// Caps recursion through the type graph. Well-formed modules cannot cycle
// (structs may only reference earlier types; pointers do not recurse), but the
// input is untrusted.
const MAX_TYPE_DEPTH: usize = 64;

/// A reflected descriptor binding: its (set, binding) slot, declared name and
/// root layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingReflection {
    /// Descriptor set index.
    pub set: u32,
    /// Binding index within the set.
    pub binding: u32,
    /// `OpName` of the bound variable, if present and non-empty.
    pub name: Option<String>,
    /// Layout tree of the binding's pointee type.
    pub ty: ReflectedType,
}

/// A reflected push-constant block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReflection {
    /// `OpName` of the block variable, if present and non-empty.
    pub name: Option<String>,
    /// Layout tree of the block's pointee type.
    pub ty: ReflectedType,
}

/// The reflection service for one module.
///
/// Built once per analysis run; read-only afterwards. Lookups that miss
/// return `None` and are treated by callers as per-trace failures, never as
/// fatal errors.
#[derive(Debug, Clone, Default)]
pub struct ModuleReflection {
    bindings: BTreeMap<(u32, u32), BindingReflection>,
    push_constants: Vec<BlockReflection>,
}

impl ModuleReflection {
    /// Reflects every buffer-like descriptor binding and push-constant block
    /// declared by `words`.
    pub fn parse(words: &[u32]) -> Result<ModuleReflection, ReflectError> {
        let module = RawModule::new(words)?;
        let mut gather = Gather::default();

        for insn in module.instructions() {
            let insn = insn?;
            gather.record(insn);
        }

        let mut reflection = ModuleReflection::default();
        for variable in &gather.variables {
            let Some(sc) = variable.operand(0) else {
                continue;
            };
            match sc {
                storage_class::UNIFORM
                | storage_class::STORAGE_BUFFER
                | storage_class::SHADER_RECORD_BUFFER_KHR => {
                    let id = variable.result_id();
                    let Some(ty) = gather.variable_pointee_type(*variable) else {
                        warn!(variable = id, "descriptor variable has no resolvable pointee type");
                        continue;
                    };
                    let set = gather.decoration(id, decoration::DESCRIPTOR_SET).unwrap_or(0);
                    let binding = gather.decoration(id, decoration::BINDING).unwrap_or(0);
                    reflection.bindings.insert(
                        (set, binding),
                        BindingReflection {
                            set,
                            binding,
                            name: gather.name_of(id),
                            ty,
                        },
                    );
                }
                storage_class::PUSH_CONSTANT => {
                    let id = variable.result_id();
                    let Some(ty) = gather.variable_pointee_type(*variable) else {
                        warn!(variable = id, "push-constant variable has no resolvable pointee type");
                        continue;
                    };
                    reflection.push_constants.push(BlockReflection {
                        name: gather.name_of(id),
                        ty,
                    });
                }
                _ => {}
            }
        }
        Ok(reflection)
    }

    /// Root layout of the binding at `(set, binding)`, if the module declares
    /// one.
    pub fn binding_type(&self, set: u32, binding: u32) -> Option<&BindingReflection> {
        self.bindings.get(&(set, binding))
    }

    /// Root layout of the (first) push-constant block, if the module declares
    /// one.
    pub fn push_constant_type(&self) -> Option<&BlockReflection> {
        self.push_constants.first()
    }

    /// All reflected descriptor bindings, ordered by (set, binding).
    pub fn bindings(&self) -> impl Iterator<Item = &BindingReflection> {
        self.bindings.values()
    }

    /// All reflected push-constant blocks, in declaration order.
    pub fn push_constant_blocks(&self) -> impl Iterator<Item = &BlockReflection> {
        self.push_constants.iter()
    }
}

/// Everything the single gather pass pulls out of the instruction stream.
#[derive(Default)]
struct Gather<'a> {
    names: HashMap<u32, String>,
    member_names: HashMap<(u32, u32), String>,
    decorations: HashMap<(u32, u32), u32>,
    member_decorations: HashMap<(u32, u32, u32), u32>,
    types: HashMap<u32, Instruction<'a>>,
    constants: HashMap<u32, u32>,
    variables: Vec<Instruction<'a>>,
}

impl<'a> Gather<'a> {
    fn record(&mut self, insn: Instruction<'a>) {
        match insn.opcode() {
            op::NAME => {
                if let Some(target) = insn.operand(0) {
                    let name = literal_string(&insn.operands()[1..]);
                    self.names.entry(target).or_insert(name);
                }
            }
            op::MEMBER_NAME => {
                if let (Some(target), Some(member)) = (insn.operand(0), insn.operand(1)) {
                    let name = literal_string(&insn.operands()[2..]);
                    self.member_names.entry((target, member)).or_insert(name);
                }
            }
            op::DECORATE => {
                if let (Some(target), Some(deco)) = (insn.operand(0), insn.operand(1)) {
                    let value = insn.operand(2).unwrap_or(0);
                    self.decorations.entry((target, deco)).or_insert(value);
                }
            }
            op::MEMBER_DECORATE => {
                if let (Some(target), Some(member), Some(deco)) =
                    (insn.operand(0), insn.operand(1), insn.operand(2))
                {
                    let value = insn.operand(3).unwrap_or(0);
                    self.member_decorations
                        .entry((target, member, deco))
                        .or_insert(value);
                }
            }
            op::CONSTANT => {
                // Only the low word matters for array lengths.
                if let Some(value) = insn.operand(0) {
                    self.constants.entry(insn.result_id()).or_insert(value);
                }
            }
            op::VARIABLE => self.variables.push(insn),
            opcode if is_type_opcode(opcode) => {
                if insn.result_id() != 0 {
                    self.types.entry(insn.result_id()).or_insert(insn);
                }
            }
            _ => {}
        }
    }

    fn name_of(&self, id: u32) -> Option<String> {
        self.names.get(&id).filter(|s| !s.is_empty()).cloned()
    }

    fn decoration(&self, id: u32, deco: u32) -> Option<u32> {
        self.decorations.get(&(id, deco)).copied()
    }

    /// Builds the layout tree of a variable's pointee type.
    fn variable_pointee_type(&self, variable: Instruction<'a>) -> Option<ReflectedType> {
        let pointer = self.types.get(&variable.type_id())?;
        if pointer.opcode() != op::TYPE_POINTER {
            return None;
        }
        let pointee = pointer.operand(1)?;
        self.build_type(pointee, 0)
    }

    fn build_type(&self, id: u32, depth: usize) -> Option<ReflectedType> {
        if depth > MAX_TYPE_DEPTH {
            warn!(type_id = id, "type tree exceeds depth cap, dropping");
            return None;
        }
        let insn = self.types.get(&id)?;
        let opcode = insn.opcode();

        let mut node = ReflectedType {
            op: opcode,
            type_name: self.name_of(id),
            ..ReflectedType::default()
        };

        match opcode {
            op::TYPE_INT | op::TYPE_FLOAT => {
                node.numeric.scalar_width = insn.operand(0).unwrap_or(0);
            }
            op::TYPE_BOOL => {}
            op::TYPE_VECTOR => {
                let component = self.build_type(insn.operand(0)?, depth + 1)?;
                node.numeric = NumericTraits {
                    vector_components: insn.operand(1).unwrap_or(0),
                    ..component.numeric
                };
            }
            op::TYPE_MATRIX => {
                let column = self.build_type(insn.operand(0)?, depth + 1)?;
                node.numeric = NumericTraits {
                    matrix_columns: insn.operand(1).unwrap_or(0),
                    matrix_rows: column.numeric.vector_components,
                    scalar_width: column.numeric.scalar_width,
                    ..NumericTraits::default()
                };
            }
            op::TYPE_STRUCT => {
                for (index, member_ty) in insn.operands().iter().enumerate() {
                    let Some(mut member) = self.build_type(*member_ty, depth + 1) else {
                        warn!(
                            struct_id = id,
                            member = index,
                            "struct member type is unresolvable, dropping struct"
                        );
                        return None;
                    };
                    let index = index as u32;
                    member.member_name = self
                        .member_names
                        .get(&(id, index))
                        .filter(|s| !s.is_empty())
                        .cloned();
                    if member.op == op::TYPE_MATRIX {
                        member.numeric.matrix_stride = self
                            .member_decorations
                            .get(&(id, index, decoration::MATRIX_STRIDE))
                            .copied()
                            .unwrap_or(0);
                    }
                    node.members.push(member);
                }
            }
            op::TYPE_ARRAY | op::TYPE_RUNTIME_ARRAY => {
                let element = self.build_type(insn.operand(0)?, depth + 1)?;
                let dim = if opcode == op::TYPE_ARRAY {
                    // The length operand names a constant; a spec-constant or
                    // missing length is recorded as 0 (treated like a runtime
                    // dimension).
                    insn.operand(1)
                        .and_then(|len_id| self.constants.get(&len_id).copied())
                        .unwrap_or(0)
                } else {
                    0
                };
                let mut dims = vec![dim];
                dims.extend_from_slice(&element.array.dims);
                node.array = ArrayTraits {
                    stride: self
                        .decoration(id, decoration::ARRAY_STRIDE)
                        .unwrap_or(element.array.stride),
                    dims,
                };
                node.numeric = element.numeric;
                // Propagate so an array of device addresses is itself
                // recognizable, and so scans can descend into arrays of
                // structs.
                node.storage_class = element.storage_class;
                node.members = element.members;
            }
            op::TYPE_POINTER => {
                // Deliberately shallow: see the type-level docs.
                node.storage_class = insn.operand(0);
            }
            _ => {}
        }
        Some(node)
    }
}

fn is_type_opcode(opcode: u16) -> bool {
    matches!(opcode, 19..=38)
}
