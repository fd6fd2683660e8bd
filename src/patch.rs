use thiserror::Error;

/// A half-open `[start, end)` byte range into the original source text.
///
/// Offsets always fall on UTF-8 character boundaries (they come from
/// tree-sitter, which only produces boundary offsets). `(0, 0)` is reserved
/// as the sentinel meaning "no resolvable source position" and is skipped by
/// everything downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub const SENTINEL: Span = Span { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted span [{start}, {end})");
        Span { start, end }
    }

    /// The reserved "position could not be resolved" value.
    pub fn is_sentinel(&self) -> bool {
        *self == Span::SENTINEL
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether two spans share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A single pending edit: replace the text at `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: Span,
    pub new_text: String,
}

/// Accumulator of pending replacements for one pass invocation.
///
/// Recording is purely additive; overlap between recorded spans is a caller
/// obligation (each pass targets disjoint node categories) and is verified
/// once, by [`apply`].
#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<Replacement>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a region of text to be replaced.
    ///
    /// Sentinel spans are dropped here: a pass that failed to resolve a
    /// node's position must not rewrite that occurrence.
    pub fn record(&mut self, span: Span, new_text: impl Into<String>) {
        if span.is_sentinel() {
            return;
        }
        self.entries.push(Replacement {
            span,
            new_text: new_text.into(),
        });
    }

    /// All recorded entries, in recording order (not sorted).
    pub fn entries(&self) -> &[Replacement] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("replacement span [{}, {}) exceeds source length {len}", span.start, span.end)]
    OutOfBounds { span: Span, len: usize },

    #[error("replacement offset {offset} is not a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error(
        "overlapping replacement spans [{}, {}) and [{}, {})",
        first.start, first.end, second.start, second.end
    )]
    Overlap { first: Span, second: Span },
}

/// Splice all recorded replacements into `original`, producing the new text.
///
/// Entries are processed in descending `(start, end)` order so that edits at
/// higher offsets never invalidate the offsets of edits still to come; no
/// bookkeeping between splices is needed. The sort is stable, so entries
/// recording the same span keep their recording order, which makes the
/// output deterministic for coincident zero-width insertions.
///
/// An empty entry list returns `original` unchanged, byte for byte.
pub fn apply(original: &str, entries: &[Replacement]) -> Result<String, PatchError> {
    if entries.is_empty() {
        return Ok(original.to_owned());
    }

    let mut pending: Vec<&Replacement> = entries
        .iter()
        .filter(|entry| !entry.span.is_sentinel())
        .collect();
    pending.sort_by(|a, b| (b.span.start, b.span.end).cmp(&(a.span.start, a.span.end)));

    for entry in &pending {
        let span = entry.span;
        if span.end > original.len() {
            return Err(PatchError::OutOfBounds {
                span,
                len: original.len(),
            });
        }
        for offset in [span.start, span.end] {
            if !original.is_char_boundary(offset) {
                return Err(PatchError::NotCharBoundary { offset });
            }
        }
    }

    // pending is sorted descending: for disjoint spans every later (lower)
    // entry must end at or before the previous (higher) entry's start.
    for window in pending.windows(2) {
        let (higher, lower) = (window[0], window[1]);
        if lower.span.end > higher.span.start {
            return Err(PatchError::Overlap {
                first: lower.span,
                second: higher.span,
            });
        }
    }

    let mut text = original.to_owned();
    for entry in pending {
        text.replace_range(entry.span.start..entry.span.end, &entry.new_text);
    }

    Ok(text)
}
