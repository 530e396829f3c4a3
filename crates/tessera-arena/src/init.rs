//! Allocation initialisation modes.

use tessera_core::Element;

/// How a newly allocated buffer is initialised.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Init<T> {
    /// No initialisation guarantee. Fresh buffers are zeroed; a recycled
    /// buffer keeps whatever its previous owner left in it.
    #[default]
    Uninit,
    /// Every element is the zero value (`false` for `bool`).
    Zeroed,
    /// Every element is the given value.
    Fill(T),
}

impl<T: Element> Init<T> {
    /// Build a fresh buffer of `len` elements.
    pub(crate) fn fresh(self, len: usize) -> Vec<T> {
        match self {
            Self::Uninit | Self::Zeroed => vec![T::default(); len],
            Self::Fill(value) => vec![value; len],
        }
    }

    /// Re-initialise a recycled buffer in place.
    pub(crate) fn reapply(self, buffer: &mut [T]) {
        match self {
            Self::Uninit => {}
            Self::Zeroed => buffer.fill(T::default()),
            Self::Fill(value) => buffer.fill(value),
        }
    }
}
