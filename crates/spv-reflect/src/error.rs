use spv_words::ModuleError;
use thiserror::Error;

/// Fatal reflection failures.
///
/// Per-binding problems (a variable whose type id is missing, a type tree
/// deeper than the recursion cap) are deliberately *not* represented here:
/// they drop the affected binding with a logged warning so the rest of the
/// module still reflects.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// The module's word stream itself is malformed.
    #[error("malformed module: {0}")]
    Malformed(#[from] ModuleError),
}
