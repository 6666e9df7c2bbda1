use std::collections::VecDeque;

use spv_reflect::ReflectedType;
use spv_words::spv::{op, storage_class};
use thiserror::Error;

use crate::provenance::{BindingIdentity, ProvenanceKey, ProvenanceMap};

/// Per-path layout resolution failures. Recoverable: the trace that hit one
/// is dropped and analysis continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutError {
    #[error("access-chain index {index} is out of range for a type with {members} members")]
    IndexOutOfRange { index: u32, members: usize },
    #[error("array members are not supported as access-chain siblings")]
    UnsupportedArraySibling,
}

/// The outcome of resolving an index path against a layout tree.
#[derive(Debug)]
pub(crate) struct ResolvedPath<'t> {
    /// Cumulative byte offset of the arrived-at member.
    pub offset: u32,
    /// Trailing array stride: the arrived-at member's declared stride when it
    /// is an array (or the stride of the innermost aggregate array stepped
    /// through).
    pub stride: u32,
    /// One resolved member name per consumed index.
    pub segments: Vec<String>,
    /// The arrived-at member.
    pub leaf: &'t ReflectedType,
}

/// Walks `indices` through `root`, summing the byte sizes of preceding
/// sibling members at each step.
pub(crate) fn compute_path_offset<'t>(
    root: &'t ReflectedType,
    indices: &[u32],
) -> Result<ResolvedPath<'t>, LayoutError> {
    let mut ty = root;
    let mut offset: u32 = 0;
    let mut stride: u32 = 0;
    let mut segments = Vec::with_capacity(indices.len());

    for &index in indices {
        let Some(member) = ty.members.get(index as usize) else {
            return Err(LayoutError::IndexOutOfRange {
                index,
                members: ty.members.len(),
            });
        };
        if matches!(ty.op, op::TYPE_ARRAY | op::TYPE_RUNTIME_ARRAY) {
            stride = ty.array.stride;
        }
        for sibling in &ty.members[..index as usize] {
            offset = offset.saturating_add(sibling_byte_size(sibling)?);
        }
        ty = member;
        segments.push(ty.path_segment().to_string());
    }

    if matches!(ty.op, op::TYPE_ARRAY | op::TYPE_RUNTIME_ARRAY) {
        stride = ty.array.stride;
    }

    Ok(ResolvedPath {
        offset,
        stride,
        segments,
        leaf: ty,
    })
}

/// Byte size of one struct member for offset summation.
///
/// Array-typed siblings are rejected: their contribution would need the full
/// multi-dimension treatment and no supported producer emits address members
/// behind one today.
fn sibling_byte_size(member: &ReflectedType) -> Result<u32, LayoutError> {
    let mut bytes = member.numeric.scalar_width / 8;
    match member.op {
        op::TYPE_VECTOR => {
            bytes = bytes.saturating_mul(member.numeric.vector_components);
        }
        op::TYPE_MATRIX => {
            bytes = bytes
                .saturating_mul(member.numeric.matrix_columns)
                .saturating_mul(member.numeric.matrix_rows)
                .max(member.numeric.matrix_stride);
        }
        op::TYPE_POINTER | op::TYPE_FORWARD_POINTER => {
            bytes = 8;
        }
        op::TYPE_ARRAY | op::TYPE_RUNTIME_ARRAY => {
            return Err(LayoutError::UnsupportedArraySibling);
        }
        _ => {}
    }
    Ok(bytes)
}

/// Byte size of one member for the declaration sweep, where arrays do get the
/// full dims-times-stride treatment (a runtime dimension counts as one
/// element, contributing just its stride).
fn swept_byte_size(member: &ReflectedType) -> u32 {
    let mut bytes = member.numeric.scalar_width / 8;
    match member.op {
        op::TYPE_VECTOR => {
            bytes = bytes.saturating_mul(member.numeric.vector_components);
        }
        op::TYPE_MATRIX => {
            bytes = bytes
                .saturating_mul(member.numeric.matrix_columns)
                .saturating_mul(member.numeric.matrix_rows)
                .max(member.numeric.matrix_stride);
        }
        op::TYPE_POINTER | op::TYPE_FORWARD_POINTER => {
            bytes = 8;
        }
        op::TYPE_ARRAY | op::TYPE_RUNTIME_ARRAY => {
            bytes = bytes.max(member.array.stride);
            for &dim in &member.array.dims {
                bytes = bytes.saturating_mul(dim.max(1));
            }
        }
        _ => {}
    }
    bytes
}

/// Breadth-first sweep of a binding's declared type tree for buffer-address
/// members, independent of any use site.
///
/// Every node whose storage class marks it as a physical-storage-buffer
/// pointer yields a provenance entry at the offset accumulated so far, with a
/// single-segment path naming the member. A backward trace that later reaches
/// the same member will replace the entry with its fuller path, under the
/// same key.
pub(crate) fn scan_for_buffer_references(
    root: &ReflectedType,
    identity: BindingIdentity,
    map: &mut ProvenanceMap,
) {
    let mut queue: VecDeque<(&ReflectedType, u32)> = VecDeque::new();
    queue.push_back((root, 0));

    while let Some((ty, offset)) = queue.pop_front() {
        if ty.storage_class == Some(storage_class::PHYSICAL_STORAGE_BUFFER) {
            let array_stride = if matches!(ty.op, op::TYPE_ARRAY | op::TYPE_RUNTIME_ARRAY) {
                ty.array.stride
            } else {
                0
            };
            map.insert(
                ProvenanceKey {
                    identity,
                    byte_offset: offset,
                    array_stride,
                },
                vec![ty.path_segment().to_string()],
            );
        }

        let mut member_offset = offset;
        for member in &ty.members {
            queue.push_back((member, member_offset));
            member_offset = member_offset.saturating_add(swept_byte_size(member));
        }
    }
}
