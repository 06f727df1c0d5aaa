use crate::types::GridPoint;

/// How often the simplifier's walk has passed a lattice point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMark {
    #[default]
    Unseen,
    Once,
    /// Passed at least twice: a seam where the boundary touches itself.
    Multiple,
}

/// Transient state shared by the tracer and the simplifier, kept beside the
/// mask rather than inside its values.
///
/// `visited` is indexed by cell, `walk` by cell corner, so the walk grid is one
/// larger in each direction.
#[derive(Debug, Clone)]
pub struct VisitGrid {
    width: u32,
    height: u32,
    visited: Vec<bool>,
    walk: Vec<WalkMark>,
}

impl VisitGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        let corners = (width as usize + 1) * (height as usize + 1);
        Self {
            width,
            height,
            visited: vec![false; cells],
            walk: vec![WalkMark::Unseen; corners],
        }
    }

    pub fn reset(&mut self) {
        self.visited.fill(false);
        self.walk.fill(WalkMark::Unseen);
    }

    fn cell_index(&self, point: GridPoint) -> Option<usize> {
        let GridPoint { x, y } = point;
        (x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    fn corner_index(&self, point: GridPoint) -> Option<usize> {
        let GridPoint { x, y } = point;
        (x >= 0 && y >= 0 && (x as u32) <= self.width && (y as u32) <= self.height)
            .then(|| y as usize * (self.width as usize + 1) + x as usize)
    }

    pub fn is_visited(&self, cell: GridPoint) -> bool {
        self.cell_index(cell).is_some_and(|i| self.visited[i])
    }

    pub fn mark_visited(&mut self, cell: GridPoint) {
        if let Some(i) = self.cell_index(cell) {
            self.visited[i] = true;
        }
    }

    pub fn walk_mark(&self, corner: GridPoint) -> WalkMark {
        self.corner_index(corner)
            .map_or(WalkMark::Unseen, |i| self.walk[i])
    }

    pub fn clear_walk(&mut self, corner: GridPoint) {
        if let Some(i) = self.corner_index(corner) {
            self.walk[i] = WalkMark::Unseen;
        }
    }

    /// Record one more pass over `corner`. Corners outside the grid are not
    /// tracked and never become seams.
    pub fn note_walk(&mut self, corner: GridPoint) -> WalkMark {
        let Some(i) = self.corner_index(corner) else {
            return WalkMark::Unseen;
        };
        self.walk[i] = match self.walk[i] {
            WalkMark::Unseen => WalkMark::Once,
            WalkMark::Once | WalkMark::Multiple => WalkMark::Multiple,
        };
        self.walk[i]
    }
}
