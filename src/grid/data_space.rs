//! Integer N-dimensional index tuples.

use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, Rem, Sub};

/// Integer tuple with one component per axis.
///
/// Used both as a cell offset and as a block index. Arithmetic is
/// component-wise. Linear mappings treat x as the fastest running axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataSpace<const D: usize>(pub [i32; D]);

impl<const D: usize> DataSpace<D> {
    /// Create from components.
    pub const fn new(components: [i32; D]) -> Self {
        Self(components)
    }

    /// All components set to `value`.
    pub const fn splat(value: i32) -> Self {
        Self([value; D])
    }

    /// Origin.
    pub const fn zero() -> Self {
        Self([0; D])
    }

    /// Product of all components (cell or block count of an extent).
    pub fn product(&self) -> i64 {
        self.0.iter().map(|&c| c as i64).product()
    }

    /// Copy with `axis` replaced by `value`.
    pub fn with_component(mut self, axis: usize, value: i32) -> Self {
        if axis < D {
            self.0[axis] = value;
        }
        self
    }

    /// True if no component is negative.
    pub fn is_non_negative(&self) -> bool {
        self.0.iter().all(|&c| c >= 0)
    }

    /// True if every component is strictly smaller than the one of `extent`.
    pub fn is_less_than(&self, extent: &Self) -> bool {
        self.0.iter().zip(extent.0.iter()).all(|(&a, &b)| a < b)
    }

    /// Map a linear index into an N-dim coordinate inside `extent`.
    #[inline]
    pub fn map_linear(extent: &Self, linear: u32) -> Self {
        let mut rest = linear as i64;
        let mut out = [0i32; D];
        for (axis, c) in out.iter_mut().enumerate() {
            let e = extent.0[axis] as i64;
            *c = (rest % e) as i32;
            rest /= e;
        }
        Self(out)
    }

    /// Linear index of this coordinate inside `extent`.
    #[inline]
    pub fn to_linear(&self, extent: &Self) -> usize {
        let mut idx = 0usize;
        let mut stride = 1usize;
        for axis in 0..D {
            idx += self.0[axis] as usize * stride;
            stride *= extent.0[axis] as usize;
        }
        idx
    }

    /// Iterate all coordinates inside `extent` in linear order.
    pub fn iter_extent(extent: Self) -> impl Iterator<Item = Self> {
        let total = extent.product().max(0) as u32;
        (0..total).map(move |i| Self::map_linear(&extent, i))
    }
}

impl<const D: usize> Default for DataSpace<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> Index<usize> for DataSpace<D> {
    type Output = i32;

    fn index(&self, axis: usize) -> &i32 {
        &self.0[axis]
    }
}

impl<const D: usize> IndexMut<usize> for DataSpace<D> {
    fn index_mut(&mut self, axis: usize) -> &mut i32 {
        &mut self.0[axis]
    }
}

impl<const D: usize> From<[i32; D]> for DataSpace<D> {
    fn from(components: [i32; D]) -> Self {
        Self(components)
    }
}

macro_rules! component_wise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<const D: usize> $trait for DataSpace<D> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                let mut out = self.0;
                for (a, b) in out.iter_mut().zip(rhs.0.iter()) {
                    *a = *a $op *b;
                }
                Self(out)
            }
        }

        impl<const D: usize> $trait<i32> for DataSpace<D> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: i32) -> Self {
                let mut out = self.0;
                for a in out.iter_mut() {
                    *a = *a $op rhs;
                }
                Self(out)
            }
        }
    };
}

component_wise!(Add, add, +);
component_wise!(Sub, sub, -);
component_wise!(Mul, mul, *);
component_wise!(Div, div, /);
component_wise!(Rem, rem, %);

impl<const D: usize> fmt::Display for DataSpace<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (axis, c) in self.0.iter().enumerate() {
            if axis > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}
