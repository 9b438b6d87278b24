use serde::{Serialize, Serializer};

/// The outcome of one extraction.
///
/// Extraction never fails on odd markup; it degrades. `Minimal` means the
/// container the record is built from was missing (or the source refused to
/// answer), so the record holds defaults rather than data. Either way the
/// record is complete and safe to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    /// Built from the expected markup.
    Full(T),
    /// Built from defaults because the expected markup wasn't there.
    Minimal(T),
}
impl<T> Extracted<T> {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    pub fn is_minimal(&self) -> bool {
        matches!(self, Self::Minimal(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Self::Full(value) | Self::Minimal(value) => value,
        }
    }

    pub fn get_mut(&mut self) -> &mut T {
        match self {
            Self::Full(value) | Self::Minimal(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Minimal(value) => value,
        }
    }

    /// Transform the record, keeping the full/minimal tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extracted<U> {
        match self {
            Self::Full(value) => Extracted::Full(f(value)),
            Self::Minimal(value) => Extracted::Minimal(f(value)),
        }
    }
}

/// Serializes as the record itself; the tag is not part of the data.
impl<T: Serialize> Serialize for Extracted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}
