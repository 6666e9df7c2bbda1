/// Width and shape facts for scalar, vector and matrix types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericTraits {
    /// Scalar bit width (32, 64, ...). Zero for non-numeric types.
    pub scalar_width: u32,
    /// Component count for vectors (and the row count source for matrices).
    pub vector_components: u32,
    /// Number of matrix columns. Zero for non-matrix types.
    pub matrix_columns: u32,
    /// Number of matrix rows. Zero for non-matrix types.
    pub matrix_rows: u32,
    /// The `MatrixStride` decoration of the enclosing struct member, if any.
    pub matrix_stride: u32,
}

/// Stride and dimension facts for array and runtime-array types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayTraits {
    /// The `ArrayStride` decoration, in bytes. Zero if undecorated.
    pub stride: u32,
    /// Outermost-first dimension lengths; a runtime dimension is recorded
    /// as zero.
    pub dims: Vec<u32>,
}

/// One node of a binding's declared layout tree.
///
/// The shape intentionally mirrors what the analyzers consume: the type
/// opcode for classification, byte-width derivation inputs in
/// [`NumericTraits`]/[`ArrayTraits`], the storage class for spotting
/// physical-storage-buffer pointers, and ordered members for descent.
/// Pointer nodes never recurse into their pointee; buffer-reference types are
/// routinely self-referential and a pointer's layout contribution is a fixed
/// 8 bytes regardless of pointee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectedType {
    /// The declaring `OpType*` opcode.
    pub op: u16,
    /// `OpName` of the type id (structs, mostly).
    pub type_name: Option<String>,
    /// `OpMemberName` within the parent struct, when this node is a member.
    pub member_name: Option<String>,
    /// Storage class for pointer nodes (propagated through arrays of
    /// pointers, so an array of device addresses is itself recognizable).
    pub storage_class: Option<u32>,
    /// Scalar/vector/matrix facts.
    pub numeric: NumericTraits,
    /// Array facts.
    pub array: ArrayTraits,
    /// Ordered members (structs; arrays carry their element's members so a
    /// breadth-first scan can descend through them).
    pub members: Vec<ReflectedType>,
}

impl ReflectedType {
    /// The name a diagnostic path segment should use for this node.
    pub fn path_segment(&self) -> &str {
        self.member_name.as_deref().unwrap_or("unknown")
    }
}
