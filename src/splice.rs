//! The fundamental rewrite primitive: verified byte-span replacement on an
//! immutable buffer.
//!
//! All higher-level reordering compiles down to [`SlotReplacement`].
//! Intelligence lives in span acquisition, not application: a replacement
//! plan is computed first, verified against the original buffer, and only
//! then applied in strictly descending offset order, so offsets stored in
//! the plan never go stale.

use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Replace `buffer[start..end]` with `replacement`.
///
/// The caller guarantees `start <= end <= buffer.len()`. The result equals
/// `buffer[..start] + replacement + buffer[end..]`; its length is exactly
/// `buffer.len() - (end - start) + replacement.len()`, and the bytes before
/// `start` and after `end` are carried over bit-for-bit.
pub fn splice(buffer: &[u8], start: usize, end: usize, replacement: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(buffer.len() - (end - start) + replacement.len());
    result.extend_from_slice(&buffer[..start]);
    result.extend_from_slice(replacement);
    result.extend_from_slice(&buffer[end..]);
    result
}

/// Verification strategy for a replacement's expected before-text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanVerification {
    /// Exact text match required.
    ExactMatch(String),
    /// xxh3 hash of the expected text (faster for large spans).
    Hash(u64),
}

impl SpanVerification {
    /// Check if the provided bytes match the verification criteria.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        match self {
            SpanVerification::ExactMatch(expected) => expected.as_bytes() == bytes,
            SpanVerification::Hash(expected_hash) => xxh3_64(bytes) == *expected_hash,
        }
    }

    /// Create verification from text, using a hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            SpanVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            SpanVerification::ExactMatch(text.to_string())
        }
    }
}

/// An instruction to replace `source[start..end]` with `text`.
#[derive(Debug, Clone)]
#[must_use = "a SlotReplacement does nothing until applied via apply_plan"]
pub struct SlotReplacement {
    /// Starting byte offset (inclusive).
    pub start: usize,
    /// Ending byte offset (exclusive).
    pub end: usize,
    /// Replacement text.
    pub text: String,
    /// What the span is expected to contain before applying.
    pub expected_before: SpanVerification,
}

impl SlotReplacement {
    /// Create a replacement with automatic verification generation.
    pub fn new(
        start: usize,
        end: usize,
        text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            expected_before: SpanVerification::from_text(expected_before),
        }
    }
}

#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("invalid byte range [{start}, {end}) in buffer of length {len}")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("replacement ranges overlap around byte {at}")]
    OverlappingRanges { at: usize },

    #[error("before-text verification failed for range [{start}, {end})")]
    BeforeTextMismatch { start: usize, end: usize },

    #[error("applying the plan would produce malformed UTF-8")]
    InvalidUtf8,
}

/// Apply a whole replacement plan to `source`, all-or-nothing.
///
/// Every range is validated and verified against the original buffer before
/// the first splice happens. Application then proceeds in descending order
/// of start offset: each splice shifts only bytes after its own position,
/// so the remaining replacements' offsets stay valid.
pub fn apply_plan(
    source: &[u8],
    mut plan: Vec<SlotReplacement>,
) -> Result<Vec<u8>, SpliceError> {
    plan.sort_by(|a, b| b.start.cmp(&a.start));

    for rep in &plan {
        if rep.start > rep.end || rep.end > source.len() {
            return Err(SpliceError::InvalidRange {
                start: rep.start,
                end: rep.end,
                len: source.len(),
            });
        }
        if !rep.expected_before.matches(&source[rep.start..rep.end]) {
            return Err(SpliceError::BeforeTextMismatch {
                start: rep.start,
                end: rep.end,
            });
        }
    }

    // Sorted descending: each window pairs a later range with an earlier one.
    for window in plan.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        if earlier.end > later.start {
            return Err(SpliceError::OverlappingRanges { at: later.start });
        }
    }

    let mut result = source.to_vec();
    for rep in &plan {
        result = splice(&result, rep.start, rep.end, rep.text.as_bytes());
    }

    if std::str::from_utf8(&result).is_err() {
        return Err(SpliceError::InvalidUtf8);
    }

    Ok(result)
}
