//! Boundary topology of the domain decomposition.

/// Face of the domain along one axis.
///
/// The laser enters the domain through the lower y face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Face at the minimum coordinate
    Lower,
    /// Face at the maximum coordinate
    Upper,
}

impl Side {
    /// Index used by per-side tables (`Lower` = 0, `Upper` = 1).
    pub fn index(&self) -> usize {
        match self {
            Side::Lower => 0,
            Side::Upper => 1,
        }
    }
}

/// Reports the boundary condition of the global domain per axis and side.
pub trait GridController: Send + Sync {
    /// True if the boundary on `side` of `axis` wraps around periodically.
    fn is_boundary_periodic(&self, axis: usize, side: Side) -> bool;
}

/// Grid controller with fixed per-axis periodicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGridController<const D: usize> {
    periodic: [bool; D],
}

impl<const D: usize> StaticGridController<D> {
    /// Controller with the given periodic flags.
    pub fn new(periodic: [bool; D]) -> Self {
        Self { periodic }
    }

    /// All boundaries absorbing.
    pub fn absorbing() -> Self {
        Self {
            periodic: [false; D],
        }
    }

    /// Mark `axis` periodic.
    pub fn with_periodic(mut self, axis: usize) -> Self {
        if axis < D {
            self.periodic[axis] = true;
        }
        self
    }
}

impl<const D: usize> GridController for StaticGridController<D> {
    fn is_boundary_periodic(&self, axis: usize, _side: Side) -> bool {
        self.periodic.get(axis).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_controller() {
        let controller = StaticGridController::<3>::absorbing().with_periodic(0);
        assert!(controller.is_boundary_periodic(0, Side::Lower));
        assert!(controller.is_boundary_periodic(0, Side::Upper));
        assert!(!controller.is_boundary_periodic(1, Side::Lower));
        assert!(!controller.is_boundary_periodic(5, Side::Lower));
    }

    #[test]
    fn test_side_index() {
        assert_eq!(Side::Lower.index(), 0);
        assert_eq!(Side::Upper.index(), 1);
    }
}
