//! Layout reflection for SPIR-V descriptor bindings and push-constant blocks.
//!
//! [`ModuleReflection`] answers one narrow question for the analyzers in this
//! workspace: "given a descriptor binding or push-constant identity, what is
//! the declared layout tree of its root type?" The trees are derived entirely
//! from the module's own `OpType*`, `OpName`/`OpMemberName` and decoration
//! instructions; nothing else about the module (entry points, execution modes,
//! interface variables) is reflected here.

#![forbid(unsafe_code)]

mod error;
mod parse;
mod types;

pub use crate::error::ReflectError;
pub use crate::parse::{BindingReflection, BlockReflection, ModuleReflection};
pub use crate::types::{ArrayTraits, NumericTraits, ReflectedType};
