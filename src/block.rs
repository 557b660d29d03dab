//! Comment-association resolution: the exact byte span of one method's
//! textual block, including its own leading documentation.
//!
//! The block start comes only from the parser's per-declaration doc
//! back-reference. The end is always the method's own closing position;
//! trailing comments live in the gap between slots and are preserved there.

use crate::model::MemberFunction;
use thiserror::Error;

/// A method's complete textual block, ready for slot replacement.
#[derive(Debug, Clone)]
pub struct MethodBlock {
    pub name: String,
    /// Start byte of the block (doc comment included).
    pub start: usize,
    /// One byte past the closing brace.
    pub end: usize,
    /// The block's source text.
    pub text: String,
    /// False when the doc span was unusable and the block degraded to the
    /// bare function span without its documentation.
    pub literal: bool,
}

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("method {name}: block span {start}..{end} out of range for buffer of {len} bytes")]
    OffsetOutOfRange {
        name: String,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// Resolve the block span for one member function.
///
/// Out-of-range or inverted doc offsets degrade to the function's own span
/// (a non-literal block); if that span is unusable too, the file cannot be
/// fixed and an error is returned so the caller keeps the original buffer.
pub fn resolve_block(member: &MemberFunction, source: &str) -> Result<MethodBlock, BlockError> {
    if let Some(text) = source.get(member.doc_start_offset..member.end_offset) {
        if member.doc_start_offset <= member.start_offset {
            return Ok(MethodBlock {
                name: member.name.clone(),
                start: member.doc_start_offset,
                end: member.end_offset,
                text: text.to_string(),
                literal: true,
            });
        }
    }

    // Degraded fallback: drop the doc association and keep the function's
    // own span.
    if let Some(text) = source.get(member.start_offset..member.end_offset) {
        if member.start_offset < member.end_offset {
            return Ok(MethodBlock {
                name: member.name.clone(),
                start: member.start_offset,
                end: member.end_offset,
                text: text.to_string(),
                literal: false,
            });
        }
    }

    Err(BlockError::OffsetOutOfRange {
        name: member.name.clone(),
        start: member.doc_start_offset,
        end: member.end_offset,
        len: source.len(),
    })
}
