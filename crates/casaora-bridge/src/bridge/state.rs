/// Progress of one turn's output stream.
///
/// Variants are ordered; a turn only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum StreamState {
    /// Nothing written yet.
    #[default]
    NotStarted,
    /// `start` written.
    Started,
    /// `text-start` written; text deltas may follow.
    TextOpen,
    /// Finalize sequence written. Terminal.
    Finished,
}

impl StreamState {
    /// Move to `Started` if nothing was written yet. Returns whether the
    /// caller must emit the `start` frame.
    pub(crate) fn begin(&mut self) -> bool {
        if *self == Self::NotStarted {
            *self = Self::Started;
            return true;
        }
        false
    }

    /// Move from `Started` to `TextOpen`. Returns whether the caller must
    /// emit the `text-start` frame.
    pub(crate) fn open_text(&mut self) -> bool {
        if *self == Self::Started {
            *self = Self::TextOpen;
            return true;
        }
        false
    }

    /// Move to `Finished`. Returns `false` if already finished.
    pub(crate) fn finish(&mut self) -> bool {
        if *self == Self::Finished {
            return false;
        }
        *self = Self::Finished;
        true
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}
