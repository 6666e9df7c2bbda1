//! A safe, zero-copy model of a SPIR-V module's instruction word stream.
//!
//! This crate is intended for analyzing **untrusted** shader modules (e.g.
//! bytecode pulled out of a capture or an arbitrary pipeline cache) without
//! panicking or reading out of bounds.
//!
//! It provides:
//!
//! - [`Instruction`], a bounds-checked view of one instruction's fixed-layout
//!   fields (opcode, length, optional result/type ids, operand words).
//! - [`RawModule`], which validates the module header and walks the stream
//!   instruction by instruction, failing fast on length mismatches.
//! - The opcode / storage-class / decoration constant tables the analyzers in
//!   this workspace need (`op`, `storage_class`, `decoration`, ...).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod instruction;
mod module;
/// SPIR-V enumerant constants (opcodes, storage classes, decorations, ...).
pub mod spv;

/// Helpers for building synthetic SPIR-V modules in tests.
///
/// This module is only available when compiling this crate's own tests, or when
/// the `test-utils` feature is enabled. It is **not** considered part of the
/// stable API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::error::ModuleError;
pub use crate::instruction::{literal_string, Instruction};
pub use crate::module::{RawModule, HEADER_WORDS, MAGIC};
