//! Budgeted Douglas-Peucker reduction of a traced ring.
//!
//! Vertices are only ever selected, never synthesized. Selection starts from
//! the two points furthest apart in Manhattan distance, adds the seam points
//! that keep holes attached to the outline, then repeatedly adds whichever
//! vertex deviates most from the current selection until the deviation drops
//! to the precision or the vertex budget runs out.

use crate::error::{RegionMapError, Result};
use crate::marks::{VisitGrid, WalkMark};
use crate::polygon::LinkedPolygon;
use crate::types::GridPoint;

impl LinkedPolygon {
    /// Select at most `max_vertices` of this ring's vertices so that no
    /// dropped vertex lies further than `precision` pixels from the chain of
    /// selected ones, and return them as a new ring in their original order.
    ///
    /// `visits` provides the walk marks used to find seam points; only the
    /// marks of this ring's own vertices are touched.
    ///
    /// Fails with [`RegionMapError::RegionTooSmall`] when the ring has fewer
    /// than two distinct points or the budget is below two.
    pub fn approximation(
        &mut self,
        max_vertices: usize,
        precision: f64,
        visits: &mut VisitGrid,
    ) -> Result<LinkedPolygon> {
        let ids = self.node_ids();
        for &id in &ids {
            self.set_taken(id, false);
        }
        if max_vertices < 2 || ids.len() < 2 {
            return Err(self.too_small());
        }

        let points: Vec<GridPoint> = ids.iter().map(|&id| self.point(id)).collect();
        let seams = seam_points(&points, visits);
        let n = points.len();
        let mut taken = vec![false; n];

        let (first, second) = manhattan_farthest_pair(&points).ok_or_else(|| self.too_small())?;
        taken[first] = true;
        taken[second] = true;
        let mut count = 2;

        for i in 0..n {
            if count >= max_vertices {
                break;
            }
            let attached = !seams[(i + n - 1) % n] || !seams[(i + 1) % n];
            if seams[i] && !taken[i] && attached {
                taken[i] = true;
                count += 1;
            }
        }

        while count < max_vertices {
            match worst_offender(&points, &taken) {
                Some((index, deviation)) if deviation > precision => {
                    taken[index] = true;
                    count += 1;
                }
                _ => break,
            }
        }

        for (&id, &selected) in ids.iter().zip(&taken) {
            self.set_taken(id, selected);
        }
        let kept: Vec<GridPoint> = points
            .iter()
            .zip(&taken)
            .filter_map(|(&point, &selected)| selected.then_some(point))
            .collect();
        LinkedPolygon::from_points(&kept).ok_or_else(|| self.too_small())
    }

    fn too_small(&self) -> RegionMapError {
        let GridPoint { x, y } = self
            .head()
            .map(|head| self.point(head))
            .unwrap_or(GridPoint::new(0, 0));
        RegionMapError::RegionTooSmall { x, y }
    }
}

/// Flag every vertex the walk passes more than once.
fn seam_points(points: &[GridPoint], visits: &mut VisitGrid) -> Vec<bool> {
    for &point in points {
        visits.clear_walk(point);
    }
    for &point in points {
        visits.note_walk(point);
    }
    points
        .iter()
        .map(|&point| visits.walk_mark(point) == WalkMark::Multiple)
        .collect()
}

/// Indices of two vertices at maximal `|dx| + |dy|`, or `None` if all
/// vertices coincide. `|dx| + |dy| = max(|Δ(x + y)|, |Δ(x - y)|)`, so the
/// extremes of both diagonals give the pair in one pass.
fn manhattan_farthest_pair(points: &[GridPoint]) -> Option<(usize, usize)> {
    let sum = |p: &GridPoint| p.x as i64 + p.y as i64;
    let diff = |p: &GridPoint| p.x as i64 - p.y as i64;

    let (mut min_sum, mut max_sum, mut min_diff, mut max_diff) = (0, 0, 0, 0);
    for (i, point) in points.iter().enumerate() {
        if sum(point) < sum(&points[min_sum]) {
            min_sum = i;
        }
        if sum(point) > sum(&points[max_sum]) {
            max_sum = i;
        }
        if diff(point) < diff(&points[min_diff]) {
            min_diff = i;
        }
        if diff(point) > diff(&points[max_diff]) {
            max_diff = i;
        }
    }

    let sum_span = sum(&points[max_sum]) - sum(&points[min_sum]);
    let diff_span = diff(&points[max_diff]) - diff(&points[min_diff]);
    if sum_span == 0 && diff_span == 0 {
        return None;
    }
    if sum_span >= diff_span {
        Some((min_sum.min(max_sum), min_sum.max(max_sum)))
    } else {
        Some((min_diff.min(max_diff), min_diff.max(max_diff)))
    }
}

/// The unselected vertex furthest from the chord between the selected
/// vertices around it, scanning every chord once.
fn worst_offender(points: &[GridPoint], taken: &[bool]) -> Option<(usize, f64)> {
    let anchors: Vec<usize> = (0..points.len()).filter(|&i| taken[i]).collect();
    let n = points.len();
    let mut worst: Option<(usize, f64)> = None;

    for (k, &start) in anchors.iter().enumerate() {
        let end = anchors[(k + 1) % anchors.len()];
        let mut j = (start + 1) % n;
        while j != end {
            let deviation = deviation(points[j], points[start], points[end]);
            match worst {
                Some((_, current)) if current >= deviation => {}
                _ => worst = Some((j, deviation)),
            }
            j = (j + 1) % n;
        }
    }
    worst
}

/// Perpendicular distance from `point` to the line through `a` and `b`, or the
/// Manhattan distance to `a` when the chord has zero length.
fn deviation(point: GridPoint, a: GridPoint, b: GridPoint) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return a.manhattan_distance(point) as f64;
    }
    let (nx, ny) = (-dy / length, dx / length);
    ((point.x - a.x) as f64 * nx + (point.y - a.y) as f64 * ny).abs()
}
