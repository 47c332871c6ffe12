use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for bomb counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, column)`, 0-based.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub trait NeighborIterExt {
    /// Iterates the 8-connected neighborhood, clipped to bounds.
    fn iter_adjacent(&self, index: Coord2) -> NeighborIter;

    /// Iterates the 4-connected (orthogonal) neighborhood, clipped to bounds.
    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_adjacent(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, bounds_of(self), &ADJACENT_8)
    }

    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, bounds_of(self), &ORTHOGONAL_4)
    }
}

fn bounds_of<T>(grid: &Array2<T>) -> Coord2 {
    let dim = grid.dim();
    (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
}

const ADJACENT_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ORTHOGONAL_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (x, y) = coords;
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = x.checked_add_signed(dx.try_into().ok()?)?;
    if next_x >= max_x {
        return None;
    }

    let next_y = y.checked_add_signed(dy.try_into().ok()?)?;
    if next_y >= max_y {
        return None;
    }

    Some((next_x, next_y))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    displacements: &'static [(isize, isize)],
    index: u8,
}

impl NeighborIter {
    fn new(center: Coord2, bounds: Coord2, displacements: &'static [(isize, isize)]) -> Self {
        Self {
            center,
            bounds,
            displacements,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= self.displacements.len() {
                return None;
            }

            let next_item = apply_delta(
                self.center,
                self.displacements[self.index as usize],
                self.bounds,
            );
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
