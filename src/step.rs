//! The patch step: one atomic, idempotent text transformation.
//!
//! A step composes the idempotency guard, the anchor locator, and one of
//! three transforms into a pure function from buffer to buffer. All I/O and
//! sequencing live in [`crate::runner`].

use crate::anchor::{self, AnchorMatch};

/// How the payload relates to the matched anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Payload goes immediately before the anchor; anchor text is preserved.
    InsertBefore,
    /// Payload goes immediately after the anchor; anchor text is preserved.
    InsertAfter,
    /// Payload replaces the anchor. Used only when the payload is written to
    /// subsume the anchor text (typically anchor plus additions), so the
    /// surrounding code still reads correctly afterwards.
    Replace,
}

/// One unit of patching work against a single buffer.
///
/// `signature` is a literal that can only appear once the step has run;
/// `anchors` are candidate insertion points tried in order. Immutable once
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchStep<'a> {
    /// Stable identifier used in reports (e.g. "declare-setter").
    pub id: &'a str,
    /// Proof of prior application; checked before anchors are consulted.
    pub signature: &'a str,
    /// Candidate anchors in priority order; first match wins.
    pub anchors: &'a [&'a str],
    pub transform: Transform,
    /// Text inserted at (or substituted for) the matched anchor.
    pub payload: &'a str,
}

/// Outcome of running one step against one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "StepApplication carries the transformed buffer on success"]
pub enum StepApplication<'a> {
    /// The transform ran; `buffer` is the new contents.
    Applied {
        buffer: String,
        matched_anchor: &'a str,
    },
    /// The signature was already present; the caller's buffer is untouched.
    AlreadyApplied,
    /// No candidate anchor matched; the caller's buffer is untouched.
    AnchorNotFound,
}

impl<'a> PatchStep<'a> {
    /// Apply this step to a buffer, producing a new buffer on success.
    ///
    /// Re-running a step against its own output always yields
    /// `AlreadyApplied`: the payload contains the signature, so the guard
    /// short-circuits before any anchor search.
    pub fn apply(&self, buffer: &str) -> StepApplication<'a> {
        if anchor::already_applied(buffer, self.signature) {
            return StepApplication::AlreadyApplied;
        }

        match anchor::locate(buffer, self.anchors) {
            Some(m) => StepApplication::Applied {
                buffer: self.transformed(buffer, &m),
                matched_anchor: m.anchor,
            },
            None => StepApplication::AnchorNotFound,
        }
    }

    /// Splice the payload around the first occurrence of the matched anchor.
    fn transformed(&self, buffer: &str, m: &AnchorMatch<'_>) -> String {
        let mut out = String::with_capacity(buffer.len() + self.payload.len());
        match self.transform {
            Transform::InsertBefore => {
                out.push_str(&buffer[..m.start]);
                out.push_str(self.payload);
                out.push_str(&buffer[m.start..]);
            }
            Transform::InsertAfter => {
                out.push_str(&buffer[..m.end()]);
                out.push_str(self.payload);
                out.push_str(&buffer[m.end()..]);
            }
            Transform::Replace => {
                out.push_str(&buffer[..m.start]);
                out.push_str(self.payload);
                out.push_str(&buffer[m.end()..]);
            }
        }
        out
    }
}
