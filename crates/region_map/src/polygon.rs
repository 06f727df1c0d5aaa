//! Circular doubly linked ring of lattice points.
//!
//! Nodes live in an arena and refer to each other by index, so handles stay
//! valid across insertions and removals. A removed node is unlinked and
//! flagged dead; its slot is never reused.

use crate::types::GridPoint;

/// Handle to a node of one [`LinkedPolygon`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy)]
struct Node {
    point: GridPoint,
    prev: usize,
    next: usize,
    taken: bool,
    alive: bool,
}

#[derive(Debug, Clone)]
pub struct LinkedPolygon {
    nodes: Vec<Node>,
    head: Option<usize>,
    len: usize,
}

impl LinkedPolygon {
    /// A one-point ring whose node links to itself
    pub fn new(point: GridPoint) -> Self {
        Self {
            nodes: vec![Node {
                point,
                prev: 0,
                next: 0,
                taken: false,
                alive: true,
            }],
            head: Some(0),
            len: 1,
        }
    }

    /// Build a ring visiting `points` in order. `None` for an empty slice.
    pub fn from_points(points: &[GridPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut ring = Self::new(*first);
        let mut last = NodeId(0);
        for &point in rest {
            last = ring.insert_after(last, point);
        }
        Some(ring)
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head.map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|node| node.alive)
    }

    pub fn point(&self, id: NodeId) -> GridPoint {
        self.nodes[id.0].point
    }

    pub fn next(&self, id: NodeId) -> NodeId {
        NodeId(self.nodes[id.0].next)
    }

    pub fn prev(&self, id: NodeId) -> NodeId {
        NodeId(self.nodes[id.0].prev)
    }

    pub fn is_taken(&self, id: NodeId) -> bool {
        self.nodes[id.0].taken
    }

    pub(crate) fn set_taken(&mut self, id: NodeId, taken: bool) {
        self.nodes[id.0].taken = taken;
    }

    fn push_node(&mut self, point: GridPoint, prev: usize, next: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            point,
            prev,
            next,
            taken: false,
            alive: true,
        });
        self.nodes[prev].next = index;
        self.nodes[next].prev = index;
        self.len += 1;
        index
    }

    /// Link a new node right after `id`.
    ///
    /// # Panics
    ///
    /// If `id` has been removed.
    pub fn insert_after(&mut self, id: NodeId, point: GridPoint) -> NodeId {
        assert!(self.is_alive(id), "insert_after on a removed node");
        let next = self.nodes[id.0].next;
        NodeId(self.push_node(point, id.0, next))
    }

    /// Link a new node right before `id`.
    ///
    /// # Panics
    ///
    /// If `id` has been removed.
    pub fn insert_before(&mut self, id: NodeId, point: GridPoint) -> NodeId {
        assert!(self.is_alive(id), "insert_before on a removed node");
        let prev = self.nodes[id.0].prev;
        NodeId(self.push_node(point, prev, id.0))
    }

    /// Unlink `id` and return its predecessor. Removing the last node empties
    /// the ring and returns `None`; removing a dead node is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        let Node { prev, next, .. } = self.nodes[id.0];
        let node = &mut self.nodes[id.0];
        node.alive = false;
        node.prev = id.0;
        node.next = id.0;
        self.len -= 1;

        if self.len == 0 {
            self.head = None;
            return None;
        }
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        if self.head == Some(id.0) {
            self.head = Some(prev);
        }
        Some(NodeId(prev))
    }

    /// Strip zero-area artifacts around `id`: a node equal to its predecessor,
    /// or the tip of an out-and-back (predecessor equal to successor). Keeps
    /// going until neither holds at the current node and returns that node, or
    /// `None` if the ring collapsed entirely.
    pub fn remove_spike(&mut self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        if !self.is_alive(current) {
            return None;
        }
        loop {
            let prev = self.prev(current);
            let next = self.next(current);
            let here = self.point(current);
            if here == self.point(prev) {
                current = self.remove(current)?;
            } else if self.point(prev) == self.point(next) {
                // The successor now duplicates the predecessor.
                self.remove(current)?;
                current = next;
            } else {
                return Some(current);
            }
        }
    }

    /// Run [`remove_spike`](Self::remove_spike) on every node until a full
    /// pass changes nothing.
    pub fn remove_all_spikes(&mut self) -> Option<NodeId> {
        loop {
            let before = self.len;
            for id in self.node_ids() {
                if self.is_alive(id) {
                    self.remove_spike(id)?;
                }
            }
            if self.len == before {
                return self.head();
            }
        }
    }

    /// Count vertices by walking the ring once.
    pub fn point_count(&self) -> usize {
        self.node_ids().len()
    }

    /// Node handles in ring order starting at the head
    pub fn node_ids(&self) -> Vec<NodeId> {
        let Some(start) = self.head else {
            return Vec::new();
        };
        let mut ids = Vec::with_capacity(self.len);
        let mut current = start;
        loop {
            ids.push(NodeId(current));
            current = self.nodes[current].next;
            if current == start {
                break;
            }
        }
        ids
    }

    pub fn points(&self) -> Vec<GridPoint> {
        self.node_ids().into_iter().map(|id| self.point(id)).collect()
    }

    /// Points in ring order starting at `id`
    pub fn points_from(&self, id: NodeId) -> Vec<GridPoint> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        let mut points = Vec::with_capacity(self.len);
        let mut current = id;
        loop {
            points.push(self.point(current));
            current = self.next(current);
            if current == id {
                break;
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> GridPoint {
        GridPoint::new(x, y)
    }

    fn assert_circular(ring: &LinkedPolygon) {
        for id in ring.node_ids() {
            let mut current = ring.next(id);
            let mut steps = 1;
            while current != id {
                assert_eq!(ring.prev(ring.next(current)), current);
                current = ring.next(current);
                steps += 1;
                assert!(steps <= ring.len(), "ring is not circular");
            }
            assert_eq!(steps, ring.len());
        }
    }

    #[test]
    fn test_single_node_links_to_itself() {
        let ring = LinkedPolygon::new(p(3, 4));
        let head = ring.head().expect("non-empty");
        assert_eq!(ring.next(head), head);
        assert_eq!(ring.prev(head), head);
        assert_eq!(ring.point_count(), 1);
    }

    #[test]
    fn test_ring_stays_circular_through_edits() {
        let mut ring = LinkedPolygon::new(p(0, 0));
        let head = ring.head().expect("non-empty");
        let a = ring.insert_after(head, p(1, 0));
        assert_circular(&ring);
        let b = ring.insert_before(head, p(0, 1));
        assert_circular(&ring);
        let c = ring.insert_after(a, p(1, 1));
        assert_circular(&ring);
        assert_eq!(ring.point_count(), 4);
        assert_eq!(ring.points(), vec![p(0, 0), p(1, 0), p(1, 1), p(0, 1)]);

        assert_eq!(ring.remove(a), Some(head));
        assert_circular(&ring);
        let d = ring.insert_before(c, p(2, 2));
        assert_circular(&ring);
        assert_eq!(ring.remove(b), Some(c));
        assert_circular(&ring);
        assert_eq!(ring.point_count(), 3);
        assert_eq!(ring.points_from(d), vec![p(2, 2), p(1, 1), p(0, 0)]);

        // handles of untouched nodes survive other edits
        assert_eq!(ring.point(c), p(1, 1));
    }

    #[test]
    fn test_random_edits_keep_ring_circular() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let mut ring = LinkedPolygon::new(p(0, 0));
        let (mut inserts, mut removes) = (1usize, 0usize);

        for _ in 0..500 {
            let ids = ring.node_ids();
            let id = ids[rng.random_range(0..ids.len())];
            let point = p(rng.random_range(-20..20), rng.random_range(-20..20));
            match rng.random_range(0..3) {
                0 => {
                    let new = ring.insert_after(id, point);
                    assert_eq!(ring.prev(new), id);
                    inserts += 1;
                }
                1 => {
                    let new = ring.insert_before(id, point);
                    assert_eq!(ring.next(new), id);
                    inserts += 1;
                }
                _ if ring.len() > 1 => {
                    let prev = ring.prev(id);
                    assert_eq!(ring.remove(id), Some(prev));
                    assert!(!ring.is_alive(id));
                    removes += 1;
                }
                _ => {}
            }
            assert_circular(&ring);
            assert_eq!(ring.point_count(), inserts - removes);
            assert_eq!(ring.len(), inserts - removes);
        }
    }

    #[test]
    fn test_remove_last_node_empties_ring() {
        let mut ring = LinkedPolygon::new(p(0, 0));
        let head = ring.head().expect("non-empty");
        let other = ring.insert_after(head, p(1, 0));
        assert_eq!(ring.remove(head), Some(other));
        assert_eq!(ring.head(), Some(other));
        assert_eq!(ring.remove(other), None);
        assert!(ring.is_empty());
        assert_eq!(ring.point_count(), 0);
        assert_eq!(ring.remove(other), None, "removing a dead node is a no-op");
    }

    #[test]
    fn test_remove_spike_strips_out_and_back() {
        // (0,0) -> (2,0) -> (2,1) -> (3,1) -> (2,1) -> (2,2) -> (0,2)
        let mut ring = LinkedPolygon::from_points(&[
            p(0, 0),
            p(2, 0),
            p(2, 1),
            p(3, 1),
            p(2, 1),
            p(2, 2),
            p(0, 2),
        ])
        .expect("non-empty");
        let tip = ring.node_ids()[3];
        let survivor = ring.remove_spike(tip).expect("ring survives");
        assert_eq!(ring.point(survivor), p(2, 1));
        assert_eq!(ring.points(), vec![p(0, 0), p(2, 0), p(2, 1), p(2, 2), p(0, 2)]);
        assert_circular(&ring);
    }

    #[test]
    fn test_remove_spike_cascades() {
        // a two-step spike: (1,0) -> (1,1) -> (1,2) -> (1,1) -> (1,0)
        let mut ring = LinkedPolygon::from_points(&[
            p(0, 0),
            p(1, 0),
            p(1, 1),
            p(1, 2),
            p(1, 1),
            p(1, 0),
            p(2, 0),
            p(2, -1),
            p(0, -1),
        ])
        .expect("non-empty");
        let tip = ring.node_ids()[3];
        ring.remove_spike(tip).expect("ring survives");
        assert_eq!(ring.points(), vec![p(0, 0), p(1, 0), p(2, 0), p(2, -1), p(0, -1)]);
    }

    #[test]
    fn test_remove_spike_is_idempotent() {
        let mut ring = LinkedPolygon::from_points(&[
            p(0, 0),
            p(4, 0),
            p(4, 0),
            p(5, 0),
            p(4, 0),
            p(4, 3),
            p(0, 3),
        ])
        .expect("non-empty");
        let start = ring.node_ids()[3];
        let once = ring.remove_spike(start).expect("ring survives");
        let points_once = ring.points();
        let twice = ring.remove_spike(once).expect("ring survives");
        assert_eq!(once, twice);
        assert_eq!(ring.points(), points_once);
        assert_eq!(points_once, vec![p(0, 0), p(4, 0), p(4, 3), p(0, 3)]);
    }

    #[test]
    fn test_remove_spike_collapses_degenerate_ring() {
        let mut ring = LinkedPolygon::from_points(&[p(0, 0), p(1, 0)]).expect("non-empty");
        let head = ring.head().expect("non-empty");
        assert_eq!(ring.remove_spike(head), None);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_remove_all_spikes() {
        let mut ring = LinkedPolygon::from_points(&[
            p(0, 0),
            p(0, 0),
            p(3, 0),
            p(3, 2),
            p(4, 2),
            p(3, 2),
            p(0, 2),
        ])
        .expect("non-empty");
        ring.remove_all_spikes().expect("ring survives");
        assert_eq!(ring.point_count(), 4);
        assert_circular(&ring);
    }
}
