use serde::{Deserialize, Serialize};

/// The narration service reports time in ticks of 100ns (10,000,000 per second).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Extra slack added to each word interval during lookup. Server-reported
/// durations are coarse and tend to end before the word is fully spoken,
/// so without this the highlight drops out between words.
pub const LOOKUP_TOLERANCE_TICKS: i64 = 2_000_000;

/// A timing annotation correlating one spoken word with its start offset
/// and duration in the synthesized audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordBoundary {
    pub text: String,
    pub offset_ticks: i64,
    pub duration_ticks: i64,
}

/// Ordered list of word boundaries for one synthesized script.
/// The wire protocol delivers boundaries with ascending offsets, so entries
/// are appended in arrival order and never re-sorted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    boundaries: Vec<WordBoundary>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one boundary in arrival order
    pub fn push(&mut self, boundary: WordBoundary) {
        self.boundaries.push(boundary);
    }

    pub fn extend<I: IntoIterator<Item = WordBoundary>>(&mut self, boundaries: I) {
        self.boundaries.extend(boundaries);
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn boundaries(&self) -> &[WordBoundary] {
        &self.boundaries
    }

    /// Find the word being spoken at `offset_ticks`.
    ///
    /// Returns the index of the last boundary whose padded interval
    /// `[offset, offset + duration + tolerance]` contains the query.
    /// Taking the last match means a playhead inside two overlapping padded
    /// intervals resolves to the word that started most recently.
    /// Linear scan; scripts stay well under a thousand words.
    pub fn lookup(&self, offset_ticks: i64) -> Option<usize> {
        self.boundaries.iter().rposition(|b| {
            offset_ticks >= b.offset_ticks
                && offset_ticks <= b.offset_ticks + b.duration_ticks + LOOKUP_TOLERANCE_TICKS
        })
    }
}
