//! Post office nodes and the adjacency-maintained office graph.

use crate::core::error::MailError;
use crate::core::heap::MinHeap;
use crate::core::letter::LetterId;

/// Identifier of a post office, chosen by the caller. Negative ids are
/// rejected at creation.
pub type OfficeId = i32;

/// Maximum number of neighbors an office can record.
pub const MAX_NEIGHBORS: usize = 100;

/// Initial slot count for each office's letter heap.
pub const HEAP_SEED_CAPACITY: usize = 10;

/// A capacity-bounded node in the routing graph.
///
/// The occupancy counter always equals the number of letter ids in the
/// heap — including delivered letters, which permanently occupy a slot.
#[derive(Debug)]
pub struct Office {
    id: OfficeId,
    capacity: u32,
    occupancy: u32,
    neighbors: Vec<OfficeId>,
    heap: MinHeap<LetterId>,
}

impl Office {
    fn new(id: OfficeId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            occupancy: 0,
            neighbors: Vec::new(),
            heap: MinHeap::with_capacity(HEAP_SEED_CAPACITY),
        }
    }

    /// This office's id.
    #[must_use]
    pub fn id(&self) -> OfficeId {
        self.id
    }

    /// Maximum number of letters that can be physically present.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of letters physically present, delivered letters included.
    #[must_use]
    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    /// Remaining room for letters.
    #[must_use]
    pub fn free_capacity(&self) -> u32 {
        self.capacity - self.occupancy
    }

    /// Whether at least one more letter fits.
    #[must_use]
    pub fn has_spare_capacity(&self) -> bool {
        self.occupancy < self.capacity
    }

    /// Neighbor office ids, in the order the edges were recorded.
    #[must_use]
    pub fn neighbors(&self) -> &[OfficeId] {
        &self.neighbors
    }

    /// Whether an edge to `other` is recorded at this office.
    #[must_use]
    pub fn is_neighbor(&self, other: OfficeId) -> bool {
        self.neighbors.contains(&other)
    }

    /// The oldest (minimum-id) letter queued here, if any.
    #[must_use]
    pub fn peek_letter(&self) -> Option<LetterId> {
        self.heap.peek()
    }

    /// Number of letter ids in the heap. Equal to `occupancy` at all times.
    #[must_use]
    pub fn queued_letters(&self) -> usize {
        self.heap.len()
    }

    /// Enqueue a letter id, counting it against capacity.
    ///
    /// # Errors
    ///
    /// [`MailError::OfficeFull`] when at capacity, or
    /// [`MailError::ResourceExhausted`] if the heap cannot grow. Occupancy
    /// is unchanged on failure.
    pub fn admit(&mut self, letter: LetterId) -> Result<(), MailError> {
        if !self.has_spare_capacity() {
            return Err(MailError::OfficeFull(self.id));
        }
        self.heap.push(letter)?;
        self.occupancy += 1;
        Ok(())
    }

    /// Remove a specific letter id from the heap, releasing its slot.
    ///
    /// Returns `false` (and changes nothing) when the id is not present.
    ///
    /// # Errors
    ///
    /// Propagates [`MailError::ResourceExhausted`] from the underlying
    /// drain-and-reload removal.
    pub fn release(&mut self, letter: LetterId) -> Result<bool, MailError> {
        let found = self.heap.remove_value(letter)?;
        if found {
            self.occupancy -= 1;
        }
        Ok(found)
    }

    /// Remove and return the oldest letter id, releasing its slot.
    pub fn take_oldest(&mut self) -> Option<LetterId> {
        let id = self.heap.pop();
        if id.is_some() {
            self.occupancy -= 1;
        }
        id
    }

    /// Snapshot the queued letter ids in ascending order, leaving the heap
    /// holding the same ids.
    ///
    /// Implemented as a drain-and-reload pass so the heap is read the same
    /// way the policies read it.
    ///
    /// # Errors
    ///
    /// Propagates [`MailError::ResourceExhausted`]; the heap still holds
    /// its original ids.
    pub fn snapshot_letters(&mut self) -> Result<Vec<LetterId>, MailError> {
        let mut ids = Vec::new();
        ids.try_reserve(self.heap.len())
            .map_err(|_| MailError::ResourceExhausted)?;
        while let Some(id) = self.heap.pop() {
            ids.push(id);
        }
        for id in &ids {
            // Cannot reallocate: the heap's storage already held these ids.
            self.heap.push(*id)?;
        }
        Ok(ids)
    }

    fn add_neighbor(&mut self, other: OfficeId) -> bool {
        if self.is_neighbor(other) {
            return true;
        }
        if self.neighbors.len() >= MAX_NEIGHBORS {
            return false;
        }
        self.neighbors.push(other);
        true
    }

    fn remove_neighbor(&mut self, other: OfficeId) {
        self.neighbors.retain(|&n| n != other);
    }
}

/// Owned collection of offices with best-effort symmetric adjacency.
///
/// Offices are kept in insertion order; that order is the "graph order" the
/// round-robin policy iterates in.
#[derive(Debug, Default)]
pub struct OfficeGraph {
    offices: Vec<Office>,
}

impl OfficeGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offices: Vec::new(),
        }
    }

    /// Number of offices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offices.len()
    }

    /// Whether the graph has no offices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offices.is_empty()
    }

    /// Offices in insertion order.
    #[must_use]
    pub fn offices(&self) -> &[Office] {
        &self.offices
    }

    /// Office ids in insertion order.
    #[must_use]
    pub fn office_ids(&self) -> Vec<OfficeId> {
        self.offices.iter().map(Office::id).collect()
    }

    /// Whether an office with this id exists.
    #[must_use]
    pub fn contains(&self, id: OfficeId) -> bool {
        self.offices.iter().any(|o| o.id == id)
    }

    /// Find an office by id.
    #[must_use]
    pub fn find(&self, id: OfficeId) -> Option<&Office> {
        self.offices.iter().find(|o| o.id == id)
    }

    /// Find an office by id, mutably.
    pub fn find_mut(&mut self, id: OfficeId) -> Option<&mut Office> {
        self.offices.iter_mut().find(|o| o.id == id)
    }

    /// Add an office, wiring symmetric edges to each requested neighbor
    /// that already exists.
    ///
    /// Neighbors that do not exist, or whose adjacency list is already at
    /// [`MAX_NEIGHBORS`], are silently skipped — best-effort symmetry, not
    /// an error.
    ///
    /// # Errors
    ///
    /// [`MailError::InvalidId`] for a negative id,
    /// [`MailError::InvalidCapacity`] for zero capacity,
    /// [`MailError::DuplicateOffice`] when the id is taken, and
    /// [`MailError::ResourceExhausted`] if office storage cannot grow. All
    /// failures leave the graph unchanged.
    pub fn add_office(
        &mut self,
        id: OfficeId,
        capacity: u32,
        neighbors: &[OfficeId],
    ) -> Result<OfficeId, MailError> {
        if id < 0 {
            return Err(MailError::InvalidId(id));
        }
        if capacity == 0 {
            return Err(MailError::InvalidCapacity(i64::from(capacity)));
        }
        if self.contains(id) {
            return Err(MailError::DuplicateOffice(id));
        }
        if self.offices.len() == self.offices.capacity() {
            self.offices
                .try_reserve(1)
                .map_err(|_| MailError::ResourceExhausted)?;
        }
        self.offices.push(Office::new(id, capacity));
        for &neighbor in neighbors {
            if neighbor != id && self.contains(neighbor) {
                self.connect(id, neighbor);
            }
        }
        tracing::info!(office = id, capacity, "office added");
        Ok(id)
    }

    /// Record a best-effort symmetric edge between two existing offices.
    ///
    /// Returns `true` if, afterwards, `a` lists `b` (the forward direction
    /// the caller asked for). The reverse edge is added only while `b` has
    /// spare adjacency slots; a capped side is silently skipped, so
    /// asymmetric edges can exist and are tolerated everywhere.
    pub fn connect(&mut self, a: OfficeId, b: OfficeId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        let forward = self
            .find_mut(a)
            .is_some_and(|office| office.add_neighbor(b));
        let reverse = self
            .find_mut(b)
            .is_some_and(|office| office.add_neighbor(a));
        if forward || reverse {
            tracing::debug!(from = a, to = b, forward, reverse, "edge recorded");
        }
        forward
    }

    /// Whether `a` and `b` are connected in either direction.
    ///
    /// Edges are best-effort symmetric, so either endpoint's list counts.
    #[must_use]
    pub fn are_connected(&self, a: OfficeId, b: OfficeId) -> bool {
        self.find(a).is_some_and(|o| o.is_neighbor(b))
            || self.find(b).is_some_and(|o| o.is_neighbor(a))
    }

    /// Detach and return the office record, without resolving its letters.
    ///
    /// Letter resolution and neighbor pruning are the mail system's job;
    /// this is the final detach step.
    pub fn detach(&mut self, id: OfficeId) -> Option<Office> {
        let index = self.offices.iter().position(|o| o.id == id)?;
        Some(self.offices.remove(index))
    }

    /// Remove `id` from every office's neighbor list.
    pub fn prune_neighbor(&mut self, id: OfficeId) {
        for office in &mut self.offices {
            office.remove_neighbor(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_caps_reverse_edge_at_max_neighbors() {
        let mut graph = OfficeGraph::new();
        graph.add_office(0, 10, &[]).unwrap();
        let cap = i32::try_from(MAX_NEIGHBORS).unwrap();
        for id in 1..=cap {
            graph.add_office(id, 10, &[0]).unwrap();
        }
        assert_eq!(graph.find(0).unwrap().neighbors().len(), MAX_NEIGHBORS);

        // The hub is capped: the forward edge is recorded, the reverse is
        // silently skipped, and the edge still counts as connected.
        graph.add_office(cap + 1, 10, &[0]).unwrap();
        assert!(graph.find(cap + 1).unwrap().is_neighbor(0));
        assert!(!graph.find(0).unwrap().is_neighbor(cap + 1));
        assert_eq!(graph.find(0).unwrap().neighbors().len(), MAX_NEIGHBORS);
        assert!(graph.are_connected(cap + 1, 0));
    }

    #[test]
    fn test_add_office_validation() {
        let mut graph = OfficeGraph::new();
        assert_eq!(graph.add_office(-1, 10, &[]), Err(MailError::InvalidId(-1)));
        assert_eq!(
            graph.add_office(1, 0, &[]),
            Err(MailError::InvalidCapacity(0))
        );
        assert_eq!(graph.add_office(1, 10, &[]), Ok(1));
        assert_eq!(
            graph.add_office(1, 15, &[]),
            Err(MailError::DuplicateOffice(1))
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_add_office_with_connections_is_symmetric() {
        let mut graph = OfficeGraph::new();
        graph.add_office(2, 15, &[]).unwrap();
        graph.add_office(1, 10, &[2]).unwrap();
        assert_eq!(graph.find(1).unwrap().neighbors(), &[2]);
        assert_eq!(graph.find(2).unwrap().neighbors(), &[1]);
        assert!(graph.are_connected(1, 2));
    }

    #[test]
    fn test_missing_neighbors_silently_skipped() {
        let mut graph = OfficeGraph::new();
        graph.add_office(1, 10, &[42, 1]).unwrap();
        assert!(graph.find(1).unwrap().neighbors().is_empty());
    }

    #[test]
    fn test_admit_and_release() {
        let mut graph = OfficeGraph::new();
        graph.add_office(1, 2, &[]).unwrap();
        let office = graph.find_mut(1).unwrap();
        office.admit(10).unwrap();
        office.admit(11).unwrap();
        assert_eq!(office.occupancy(), 2);
        assert_eq!(office.admit(12), Err(MailError::OfficeFull(1)));
        assert_eq!(office.occupancy(), 2);
        assert!(office.release(10).unwrap());
        assert_eq!(office.occupancy(), 1);
        assert!(!office.release(10).unwrap());
        assert_eq!(office.occupancy(), 1);
    }

    #[test]
    fn test_snapshot_preserves_heap() {
        let mut graph = OfficeGraph::new();
        graph.add_office(1, 10, &[]).unwrap();
        let office = graph.find_mut(1).unwrap();
        for id in [5u64, 2, 9] {
            office.admit(id).unwrap();
        }
        assert_eq!(office.snapshot_letters().unwrap(), vec![2, 5, 9]);
        assert_eq!(office.queued_letters(), 3);
        assert_eq!(office.occupancy(), 3);
        assert_eq!(office.peek_letter(), Some(2));
    }

    #[test]
    fn test_detach_and_prune() {
        let mut graph = OfficeGraph::new();
        graph.add_office(1, 10, &[]).unwrap();
        graph.add_office(2, 10, &[1]).unwrap();
        graph.add_office(3, 10, &[1, 2]).unwrap();
        assert!(graph.detach(1).is_some());
        graph.prune_neighbor(1);
        assert!(graph.detach(1).is_none());
        assert_eq!(graph.find(2).unwrap().neighbors(), &[3]);
        assert_eq!(graph.find(3).unwrap().neighbors(), &[2]);
    }
}
