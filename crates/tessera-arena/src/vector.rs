//! Arena-backed vectors.

use std::fmt;

use tessera_core::{Element, LinalgError};

use crate::container::{sealed, Container};
use crate::handle::RawHandle;

/// A handle onto a length-`n` buffer in an [`Arena`](crate::Arena).
///
/// Cloning aliases the same buffer. Element access goes through
/// [`get`](Vector::get) / [`set`](Vector::set) (or
/// [`Container::with_slice`] for bulk access) because the buffer is owned by
/// the arena, not by the handle.
pub struct Vector<T: Element> {
    raw: RawHandle<T>,
}

impl<T: Element> Vector<T> {
    fn check_index(&self, op: &'static str, index: usize) -> Result<(), LinalgError> {
        let bound = self.len();
        if index >= bound {
            return Err(LinalgError::IndexOutOfRange { op, index, bound });
        }
        Ok(())
    }

    /// Element `index`, or an error when out of range.
    pub fn try_get(&self, index: usize) -> Result<T, LinalgError> {
        self.check_index("Vector::get", index)?;
        Ok(self.with_slice(|s| s[index]))
    }

    /// Set element `index`, or return an error when out of range.
    pub fn try_set(&self, index: usize, value: T) -> Result<(), LinalgError> {
        self.check_index("Vector::set", index)?;
        self.with_slice_mut(|s| s[index] = value);
        Ok(())
    }

    /// Element `index`.
    ///
    /// # Panics
    ///
    /// If `index >= len()`.
    pub fn get(&self, index: usize) -> T {
        self.try_get(index).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Set element `index` (visible through every alias).
    ///
    /// # Panics
    ///
    /// If `index >= len()`.
    pub fn set(&self, index: usize, value: T) {
        self.try_set(index, value).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl<T: Element> sealed::Sealed<T> for Vector<T> {
    fn from_raw(raw: RawHandle<T>) -> Self {
        debug_assert_eq!(raw.shape.kind(), tessera_core::ShapeKind::Vector);
        Self { raw }
    }
}

impl<T: Element> Container<T> for Vector<T> {
    type Rebind<U: Element> = Vector<U>;

    fn raw(&self) -> &RawHandle<T> {
        &self.raw
    }
}

impl<T: Element> Clone for Vector<T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
        }
    }
}

impl<T: Element> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}>{} ({})", T::NAME, self.raw.shape, self.raw.key)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Arena, Container, Init};

    #[test]
    fn get_set_through_alias() {
        let arena = Arena::default();
        let v = arena.vec::<i32>(3, Init::Zeroed);
        let alias = v.clone();
        alias.set(1, 7);
        assert_eq!(v.get(1), 7);
        assert_eq!(v.buffer_id(), alias.buffer_id());
    }

    #[test]
    fn out_of_range_is_an_error() {
        let arena = Arena::default();
        let v = arena.vec_from(&[1.0f32, 2.0]);
        assert!(v.try_get(2).is_err());
        assert!(v.try_set(5, 0.0).is_err());
        assert_eq!(v.to_vec(), [1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "Vector::get: index 4 out of range for bound 4")]
    fn get_out_of_range_panics() {
        let arena = Arena::default();
        arena.vec::<f64>(4, Init::Zeroed).get(4);
    }

    #[test]
    fn tags_and_shape() {
        let arena = Arena::default();
        let p = arena.vec::<bool>(5, Init::Fill(true));
        let t = arena.temp_vec::<bool>(0, Init::Zeroed);
        assert!(p.is_persistent() && !p.is_temp());
        assert!(t.is_temp() && t.is_empty());
        assert_eq!(p.len(), 5);
        assert_eq!(p.arena_id(), arena.id());
        assert!(p.check_valid());
    }

    #[test]
    fn fill_and_copy() {
        let arena = Arena::default();
        let a = arena.vec::<i16>(3, Init::Zeroed);
        a.fill(4);
        assert_eq!(a.to_vec(), [4, 4, 4]);
        a.copy_from_slice(&[1, 2, 3]).unwrap();
        let b = arena.vec::<i16>(3, Init::Zeroed);
        b.copy_inpl(&a).unwrap();
        assert!(b.equals_by_value(&a));
        assert!(a.copy_from_slice(&[1]).is_err());
        let c = arena.vec::<i16>(2, Init::Zeroed);
        assert!(c.copy_inpl(&a).is_err());
        assert_eq!(c.to_vec(), [0, 0]);
    }

    #[test]
    fn debug_names_type_and_slot() {
        let arena = Arena::default();
        let v = arena.temp_vec::<f32>(2, Init::Zeroed);
        assert_eq!(format!("{v:?}"), "Vector<f32>[2] (temp vector#0@0)");
    }
}
