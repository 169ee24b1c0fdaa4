//! Lookup latch.
//!
//! A resolution keeps one latch that starts empty and is filled by the first
//! successful probe. The two retry points (a directory giving its `.html`
//! sibling a chance, and the fallback page) `take` the current value,
//! re-probe, and `restore` what they took if the retry found nothing.

use sp_archive::Entry;

/// Result of a probe sequence so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Lookup {
    /// No probe has succeeded yet.
    #[default]
    NotFound,
    /// A probe succeeded; later probes are skipped.
    Found(Entry),
}

impl Lookup {
    /// True once an entry has been latched.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// True if the latched entry is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Found(entry) if entry.is_dir())
    }

    /// Latch `entry` unless something is already latched.
    ///
    /// Returns whether the entry was taken.
    pub fn record(&mut self, entry: Entry) -> bool {
        if self.is_found() {
            return false;
        }
        *self = Self::Found(entry);
        true
    }

    /// Clear the latch, handing back its previous value.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Put back a value saved with [`Lookup::take`] if nothing was latched
    /// in the meantime.
    pub fn restore(&mut self, saved: Self) {
        if !self.is_found() {
            *self = saved;
        }
    }

    /// Latched entry, if any.
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Self::Found(entry) => Some(entry),
            Self::NotFound => None,
        }
    }

    /// Consume the latch, yielding the entry.
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Self::Found(entry) => Some(entry),
            Self::NotFound => None,
        }
    }
}

impl From<Lookup> for Option<Entry> {
    fn from(lookup: Lookup) -> Self {
        lookup.into_entry()
    }
}
