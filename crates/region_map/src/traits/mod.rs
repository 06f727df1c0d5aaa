use crate::types::GridPoint;

/// Associates traced regions with caller objects.
///
/// Called once per region that survived simplification, with the region's
/// mask value and the seed cell it was traced from (mask coordinates).
/// Returning `None` leaves the region out of the map.
pub trait TagProvider<T> {
    fn tag_for(&mut self, value: u32, seed: GridPoint) -> Option<T>;
}

impl<T, F> TagProvider<T> for F
where
    F: FnMut(u32, GridPoint) -> Option<T>,
{
    fn tag_for(&mut self, value: u32, seed: GridPoint) -> Option<T> {
        self(value, seed)
    }
}
