use spv_reflect::ReflectError;
use spv_words::ModuleError;
use thiserror::Error;

/// Fatal analysis failures.
///
/// Only defects in the module's word stream abort a run. Everything that can
/// go wrong while resolving an individual trace (unsupported opcodes,
/// out-of-range access-chain indices, reflection lookup misses, type
/// mismatches at the traced member) is recoverable: the trace is dropped with
/// a logged warning and the run still succeeds with the entries that did
/// resolve.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The instruction stream is malformed.
    #[error("malformed module: {0}")]
    Malformed(#[from] ModuleError),
    /// Reflection of the module's declared layouts failed outright.
    #[error("reflection failed: {0}")]
    Reflection(#[from] ReflectError),
}
