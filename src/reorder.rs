//! Slot-based method reordering.
//!
//! Each type's methods are indexed 0..n-1 by original source order; these
//! are the slots. The expected order names which method belongs at each
//! slot, and every slot's original byte range receives that method's
//! original, unmodified text. Bytes between slots are never part of any
//! replacement, so standalone functions, blank lines, and unrelated
//! declarations survive byte-for-byte.

use crate::block::{resolve_block, BlockError, MethodBlock};
use crate::model::TypeGroup;
use crate::splice::{apply_plan, SlotReplacement, SpliceError};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReorderError {
    #[error("type {type_name}: method count mismatch: {expected} expected vs {actual} slots")]
    MethodCountMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("type {type_name}: method {method} not found in source map")]
    MethodNotFound { type_name: String, method: String },

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Splice(#[from] SpliceError),
}

/// Rewrite `source` so every given type group's methods appear in the
/// expected order. Returns the new buffer; `source` is never mutated.
///
/// Groups that already match their expected order contribute nothing.
pub fn reorder_file<'a>(
    source: &str,
    groups: impl IntoIterator<Item = &'a TypeGroup>,
) -> Result<String, ReorderError> {
    let mut plan = Vec::new();
    for group in groups {
        if !group.needs_reordering() {
            continue;
        }
        plan.extend(slot_replacements(group, source)?);
    }

    if plan.is_empty() {
        return Ok(source.to_string());
    }

    let rewritten = apply_plan(source.as_bytes(), plan)?;
    // apply_plan has already validated UTF-8.
    String::from_utf8(rewritten).map_err(|_| ReorderError::Splice(SpliceError::InvalidUtf8))
}

/// One replacement per slot: slot i's byte range receives the text of the
/// method the expected order puts at position i.
fn slot_replacements(
    group: &TypeGroup,
    source: &str,
) -> Result<Vec<SlotReplacement>, ReorderError> {
    let blocks = group
        .methods
        .iter()
        .map(|m| resolve_block(m, source))
        .collect::<Result<Vec<MethodBlock>, BlockError>>()?;

    let by_name: HashMap<&str, &str> = blocks
        .iter()
        .map(|b| (b.name.as_str(), b.text.as_str()))
        .collect();

    let expected = group.expected_order();
    if expected.len() != blocks.len() {
        return Err(ReorderError::MethodCountMismatch {
            type_name: group.type_name.clone(),
            expected: expected.len(),
            actual: blocks.len(),
        });
    }

    let mut plan = Vec::with_capacity(blocks.len());
    for (slot, incoming) in blocks.iter().zip(&expected) {
        let text = by_name
            .get(incoming.name.as_str())
            .ok_or_else(|| ReorderError::MethodNotFound {
                type_name: group.type_name.clone(),
                method: incoming.name.clone(),
            })?;
        plan.push(SlotReplacement::new(
            slot.start,
            slot.end,
            text.to_string(),
            &slot.text,
        ));
    }

    Ok(plan)
}
