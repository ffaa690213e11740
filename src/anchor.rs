//! Literal-substring anchor location and the idempotency guard.
//!
//! All matching in this crate is literal, never syntactic. An anchor is just
//! a substring expected to exist in the target file; candidates are tried in
//! declared order so that a step keeps working when the primary anchor text
//! drifts between upstream releases.

/// A successful anchor lookup: which candidate matched and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch<'a> {
    /// The candidate that matched, verbatim.
    pub anchor: &'a str,
    /// Byte offset of its first occurrence in the buffer.
    pub start: usize,
}

impl<'a> AnchorMatch<'a> {
    /// Byte offset just past the matched anchor text.
    pub fn end(&self) -> usize {
        self.start + self.anchor.len()
    }
}

/// Try each candidate anchor in order and return the first one present.
///
/// Only the first occurrence of the winning candidate is reported; later
/// occurrences are ignored by design. Returns `None` when no candidate
/// matches (including for an empty candidate list).
pub fn locate<'a>(buffer: &str, anchors: &[&'a str]) -> Option<AnchorMatch<'a>> {
    anchors
        .iter()
        .copied()
        .find_map(|anchor| buffer.find(anchor).map(|start| AnchorMatch { anchor, start }))
}

/// True iff the signature occurs anywhere in the buffer.
///
/// Signatures are chosen so they can only appear once the associated patch
/// has run, which makes this check prove prior application.
pub fn already_applied(buffer: &str, signature: &str) -> bool {
    buffer.contains(signature)
}
