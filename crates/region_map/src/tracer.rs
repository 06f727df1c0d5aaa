//! Boundary growing on the pixel grid.
//!
//! A trace starts from the four corners of one seed cell and repeatedly
//! pushes each boundary edge outward over the cell on its outer side, as long
//! as that cell carries the seed's value and has not been absorbed yet. The
//! ring keeps the absorbed cells on the left of every edge (counter-clockwise
//! with Y up). Edges shared by two absorbed cells either cancel out as spikes
//! or, when a region closes around a hole, stay behind as a doubled seam that
//! joins the hole outline to the outer outline.

use tracing::{debug, warn};

use crate::marks::VisitGrid;
use crate::pixel_mask::PixelMask;
use crate::polygon::{LinkedPolygon, NodeId};
use crate::types::GridPoint;

/// Direction of a unit boundary edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    East,
    North,
    West,
    South,
}

impl Heading {
    fn of_edge(from: GridPoint, to: GridPoint) -> Option<Self> {
        match (to.x - from.x, to.y - from.y) {
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::North),
            (-1, 0) => Some(Self::West),
            (0, -1) => Some(Self::South),
            _ => None,
        }
    }

    /// Unit step toward the outside of the region (right-hand side)
    fn outward(self) -> (i32, i32) {
        match self {
            Self::East => (0, -1),
            Self::North => (1, 0),
            Self::West => (0, 1),
            Self::South => (-1, 0),
        }
    }
}

/// Cell on the outer side of the edge `from -> to`, with the two corners that
/// replace the edge once the cell is absorbed.
struct Expansion {
    cell: GridPoint,
    first: GridPoint,
    second: GridPoint,
}

impl Expansion {
    fn of_edge(from: GridPoint, to: GridPoint) -> Option<Self> {
        let (dx, dy) = Heading::of_edge(from, to)?.outward();
        let first = GridPoint::new(from.x + dx, from.y + dy);
        let second = GridPoint::new(to.x + dx, to.y + dy);
        let cell = GridPoint::new(
            from.x.min(to.x).min(first.x),
            from.y.min(to.y).min(first.y),
        );
        Some(Self { cell, first, second })
    }
}

pub struct BoundaryTracer<'a> {
    mask: &'a PixelMask,
    visits: &'a mut VisitGrid,
    max_absorbed: usize,
}

impl<'a> BoundaryTracer<'a> {
    pub fn new(mask: &'a PixelMask, visits: &'a mut VisitGrid) -> Self {
        Self {
            max_absorbed: mask.pixel_count(),
            mask,
            visits,
        }
    }

    /// Whether `cell` is an interior cell holding `value` that no trace has
    /// absorbed yet. Border cells always read as background.
    fn can_absorb(&self, cell: GridPoint, value: u32) -> bool {
        !self.mask.is_border(cell.x, cell.y)
            && self.mask.get_point(cell) == value
            && !self.visits.is_visited(cell)
    }

    /// Trace the region containing `seed`. Returns `None` when the seed is
    /// background, on the border, already absorbed, or the ring collapses.
    pub fn trace(&mut self, seed: GridPoint) -> Option<LinkedPolygon> {
        let value = self.mask.get_point(seed);
        if value == 0 || !self.can_absorb(seed, value) {
            return None;
        }

        let GridPoint { x, y } = seed;
        let mut ring = LinkedPolygon::new(seed);
        let start = ring.head()?;
        let corner = ring.insert_after(start, GridPoint::new(x + 1, y));
        let corner = ring.insert_after(corner, GridPoint::new(x + 1, y + 1));
        ring.insert_after(corner, GridPoint::new(x, y + 1));
        self.visits.mark_visited(seed);

        let mut absorbed = 1usize;
        let mut cursor = start;
        let mut idle = 0usize;
        // A full lap without growth means every outer neighbour was checked.
        while idle < ring.len() {
            let next = ring.next(cursor);
            let expansion = Expansion::of_edge(ring.point(cursor), ring.point(next))
                .filter(|expansion| self.can_absorb(expansion.cell, value));

            let Some(expansion) = expansion else {
                cursor = next;
                idle += 1;
                continue;
            };

            if absorbed >= self.max_absorbed {
                warn!(
                    seed_x = x,
                    seed_y = y,
                    absorbed,
                    "boundary growth exceeded the pixel count, stopping"
                );
                break;
            }

            cursor = absorb(&mut ring, cursor, next, &expansion)?;
            self.visits.mark_visited(expansion.cell);
            absorbed += 1;
            idle = 0;
        }

        ring.remove_all_spikes()?;
        debug!(
            seed_x = x,
            seed_y = y,
            value,
            cells = absorbed,
            vertices = ring.len(),
            "traced region boundary"
        );
        Some(ring)
    }
}

/// Replace the edge `from -> to` with the far side of the expansion cell and
/// clean up the spikes this leaves. Returns the node to continue from, at or
/// before `from` so the new edges are examined next.
fn absorb(
    ring: &mut LinkedPolygon,
    from: NodeId,
    to: NodeId,
    expansion: &Expansion,
) -> Option<NodeId> {
    let first = ring.insert_after(from, expansion.first);
    let second = ring.insert_after(first, expansion.second);

    let resume = ring.remove_spike(from)?;
    for id in [first, second, to] {
        if ring.is_alive(id) {
            ring.remove_spike(id)?;
        }
    }

    if ring.is_alive(resume) {
        Some(resume)
    } else {
        ring.head()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_mask(width: u32, height: u32, cells: &[(i32, i32)]) -> PixelMask {
        let mut mask = PixelMask::new(width, height).expect("valid dimensions");
        for &(x, y) in cells {
            mask.set(x, y, 1);
        }
        mask
    }

    fn filled_rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
        (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| (x, y)))
            .collect()
    }

    fn bounds(points: &[GridPoint]) -> (i32, i32, i32, i32) {
        let min_x = points.iter().map(|p| p.x).min().expect("points");
        let min_y = points.iter().map(|p| p.y).min().expect("points");
        let max_x = points.iter().map(|p| p.x).max().expect("points");
        let max_y = points.iter().map(|p| p.y).max().expect("points");
        (min_x, min_y, max_x, max_y)
    }

    #[test]
    fn test_single_cell_ring() {
        let mask = create_test_mask(5, 5, &[(2, 2)]);
        let mut visits = VisitGrid::new(5, 5);
        let ring = BoundaryTracer::new(&mask, &mut visits)
            .trace(GridPoint::new(2, 2))
            .expect("cell should trace");
        assert_eq!(
            ring.points(),
            vec![
                GridPoint::new(2, 2),
                GridPoint::new(3, 2),
                GridPoint::new(3, 3),
                GridPoint::new(2, 3),
            ]
        );
        assert!(visits.is_visited(GridPoint::new(2, 2)));
    }

    #[test]
    fn test_rectangle_outline() {
        let mask = create_test_mask(12, 10, &filled_rect(2, 3, 8, 6));
        let mut visits = VisitGrid::new(12, 10);
        let ring = BoundaryTracer::new(&mask, &mut visits)
            .trace(GridPoint::new(2, 3))
            .expect("rectangle should trace");

        let points = ring.points();
        assert_eq!(bounds(&points), (2, 3, 9, 7));
        // every unit step of the perimeter is a vertex
        assert_eq!(ring.len(), 2 * (7 + 4));
        for x in 2..=8 {
            for y in 3..=6 {
                assert!(visits.is_visited(GridPoint::new(x, y)));
            }
        }
    }

    #[test]
    fn test_l_shape_absorbs_all_cells() {
        let mut cells = filled_rect(2, 2, 7, 3);
        cells.extend(filled_rect(2, 4, 3, 8));
        let mask = create_test_mask(10, 10, &cells);
        let mut visits = VisitGrid::new(10, 10);
        let ring = BoundaryTracer::new(&mask, &mut visits)
            .trace(GridPoint::new(5, 3))
            .expect("L shape should trace");

        for &(x, y) in &cells {
            assert!(visits.is_visited(GridPoint::new(x, y)), "cell ({x}, {y}) not absorbed");
        }
        // perimeter of the L: 2 * (6 + 7) unit edges
        assert_eq!(ring.len(), 26);
    }

    #[test]
    fn test_does_not_cross_into_other_values() {
        let mut mask = create_test_mask(10, 6, &filled_rect(1, 1, 8, 4));
        for y in 1..=4 {
            for x in 5..=8 {
                mask.set(x, y, 2);
            }
        }
        let mut visits = VisitGrid::new(10, 6);
        let ring = BoundaryTracer::new(&mask, &mut visits)
            .trace(GridPoint::new(1, 1))
            .expect("left half should trace");
        assert_eq!(bounds(&ring.points()), (1, 1, 5, 5));
        assert!(!visits.is_visited(GridPoint::new(5, 2)));
    }

    #[test]
    fn test_hole_becomes_seam() {
        let mut cells = filled_rect(2, 2, 9, 9);
        cells.retain(|&(x, y)| !(5..=6).contains(&x) || !(5..=6).contains(&y));
        let mask = create_test_mask(12, 12, &cells);
        let mut visits = VisitGrid::new(12, 12);
        let ring = BoundaryTracer::new(&mask, &mut visits)
            .trace(GridPoint::new(2, 2))
            .expect("donut should trace");

        let points = ring.points();
        // outer and hole outlines are both part of the single walk
        assert!(points.contains(&GridPoint::new(2, 2)));
        assert!(points.contains(&GridPoint::new(10, 10)));
        assert!(points.contains(&GridPoint::new(5, 5)));
        assert!(points.contains(&GridPoint::new(7, 7)));
        assert!(!visits.is_visited(GridPoint::new(5, 5)));
        for &(x, y) in &cells {
            assert!(visits.is_visited(GridPoint::new(x, y)));
        }
        // 32 outer + 8 hole unit edges plus a doubled seam
        assert!(ring.len() > 40);
    }

    #[test]
    fn test_rejects_background_border_and_visited_seeds() {
        let mask = create_test_mask(6, 6, &[(0, 2), (2, 2)]);
        let mut visits = VisitGrid::new(6, 6);
        let mut tracer = BoundaryTracer::new(&mask, &mut visits);
        assert!(tracer.trace(GridPoint::new(3, 3)).is_none());
        assert!(tracer.trace(GridPoint::new(0, 2)).is_none());
        assert!(tracer.trace(GridPoint::new(2, 2)).is_some());
        assert!(tracer.trace(GridPoint::new(2, 2)).is_none());
    }

    #[test]
    fn test_diagonal_neighbours_are_separate_regions() {
        let mask = create_test_mask(6, 6, &[(2, 2), (3, 3)]);
        let mut visits = VisitGrid::new(6, 6);
        let mut tracer = BoundaryTracer::new(&mask, &mut visits);
        let ring = tracer.trace(GridPoint::new(2, 2)).expect("first cell");
        assert_eq!(ring.len(), 4);
        assert!(tracer.trace(GridPoint::new(3, 3)).is_some());
    }
}
