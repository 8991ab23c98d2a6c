//! The mail system root aggregate.
//!
//! One [`MailSystem`] per running simulation: it owns the office graph, the
//! letter ledger, and an optional journal sink, and exposes the add/remove/
//! find/transfer operations the driver and the routing policies consume.
//! Single-threaded by design; callers serialize access externally.

use serde::Serialize;

use crate::core::error::MailError;
use crate::core::journal::{JournalEvent, JournalSink};
use crate::core::letter::{Letter, LetterCategory, LetterId, LetterLedger, LetterState};
use crate::core::office::{Office, OfficeGraph, OfficeId};

/// Occupancy row for one office.
#[derive(Debug, Clone, Serialize)]
pub struct OfficeStatus {
    /// Office id.
    pub id: OfficeId,
    /// Capacity ceiling.
    pub capacity: u32,
    /// Letters physically present, delivered ones included.
    pub occupancy: u32,
    /// Recorded neighbor ids.
    pub neighbors: Vec<OfficeId>,
}

/// Snapshot of system-wide counters for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    /// Per-office occupancy rows, in graph order.
    pub offices: Vec<OfficeStatus>,
    /// Letters ever created.
    pub letters_total: usize,
    /// Letters still being routed.
    pub in_transit: usize,
    /// Letters that reached their destination.
    pub delivered: usize,
    /// Letters that can never be delivered.
    pub undeliverable: usize,
}

/// Root aggregate owning offices, letters, and the id counter.
#[derive(Default)]
pub struct MailSystem {
    graph: OfficeGraph,
    ledger: LetterLedger,
    journal: Option<Box<dyn JournalSink>>,
}

impl MailSystem {
    /// Create an empty mail system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: OfficeGraph::new(),
            ledger: LetterLedger::new(),
            journal: None,
        }
    }

    /// Attach a journal sink receiving one event per significant change.
    #[must_use]
    pub fn with_journal(mut self, journal: Box<dyn JournalSink>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// The office graph, read-only.
    #[must_use]
    pub fn graph(&self) -> &OfficeGraph {
        &self.graph
    }

    /// The letter ledger, read-only.
    #[must_use]
    pub fn ledger(&self) -> &LetterLedger {
        &self.ledger
    }

    pub(crate) fn graph_mut(&mut self) -> &mut OfficeGraph {
        &mut self.graph
    }

    pub(crate) fn record(&mut self, kind: &'static str, detail: String) {
        if let Some(journal) = self.journal.as_mut() {
            journal.record(JournalEvent::new(kind, detail));
        }
    }

    /// Add an office, wiring symmetric edges to existing requested neighbors.
    ///
    /// # Errors
    ///
    /// See [`OfficeGraph::add_office`]; every failure is an atomic no-op.
    pub fn add_office(
        &mut self,
        id: OfficeId,
        capacity: u32,
        neighbors: &[OfficeId],
    ) -> Result<OfficeId, MailError> {
        let id = self.graph.add_office(id, capacity, neighbors)?;
        self.record("office_added", format!("office {id} capacity {capacity}"));
        Ok(id)
    }

    /// Remove an office, resolving every letter queued there first.
    ///
    /// In-transit letters whose origin or destination is the removed office
    /// become undeliverable; others move to the first neighbor with spare
    /// capacity, in adjacency order, or become undeliverable when no
    /// neighbor has room. Delivered and undeliverable letters keep their
    /// terminal state and are discarded with the office record. Finally the
    /// office id is pruned from every remaining neighbor list.
    ///
    /// # Errors
    ///
    /// [`MailError::OfficeNotFound`] when the id does not exist; no state
    /// changes in that case.
    pub fn remove_office(&mut self, id: OfficeId) -> Result<(), MailError> {
        let mut office = self
            .graph
            .detach(id)
            .ok_or(MailError::OfficeNotFound(id))?;
        let neighbors: Vec<OfficeId> = office.neighbors().to_vec();

        while let Some(letter_id) = office.take_oldest() {
            let Some(letter) = self.ledger.find(letter_id) else {
                continue;
            };
            if !letter.is_in_transit() {
                // Terminal states never revert; the record just loses its slot.
                continue;
            }
            if letter.origin == id || letter.destination == id {
                self.mark_undeliverable(letter_id, "endpoint office removed");
                continue;
            }
            let mut rerouted = false;
            for &neighbor in &neighbors {
                let Some(target) = self.graph.find_mut(neighbor) else {
                    continue;
                };
                if target.admit(letter_id).is_ok() {
                    if let Some(letter) = self.ledger.find_mut(letter_id) {
                        letter.current_office = neighbor;
                    }
                    tracing::info!(letter = letter_id, from = id, to = neighbor, "letter rerouted");
                    self.record(
                        "letter_transferred",
                        format!("letter {letter_id} rerouted {id} -> {neighbor}"),
                    );
                    rerouted = true;
                    break;
                }
            }
            if !rerouted {
                self.mark_undeliverable(letter_id, "no neighbor with spare capacity");
            }
        }

        self.graph.prune_neighbor(id);
        tracing::info!(office = id, "office removed");
        self.record("office_removed", format!("office {id}"));
        Ok(())
    }

    /// Find an office by id.
    #[must_use]
    pub fn find_office(&self, id: OfficeId) -> Option<&Office> {
        self.graph.find(id)
    }

    /// Find a letter by id.
    #[must_use]
    pub fn find_letter(&self, id: LetterId) -> Option<&Letter> {
        self.ledger.find(id)
    }

    /// Create a letter and enqueue it at its origin office.
    ///
    /// If no edge exists between the endpoints, a best-effort symmetric one
    /// is created first — posting a letter grows the topology. Rejection is
    /// atomic: a full origin returns [`MailError::OfficeFull`] with no
    /// ledger record and no consumed id.
    ///
    /// # Errors
    ///
    /// [`MailError::InvalidParameter`] for a negative priority or empty
    /// payload, [`MailError::OfficeNotFound`] for a missing endpoint,
    /// [`MailError::OfficeFull`] when the origin has no spare capacity, and
    /// [`MailError::ResourceExhausted`] on allocation failure.
    pub fn add_letter(
        &mut self,
        category: LetterCategory,
        priority: i32,
        from: OfficeId,
        to: OfficeId,
        payload: &str,
    ) -> Result<LetterId, MailError> {
        if priority < 0 {
            return Err(MailError::InvalidParameter("negative priority"));
        }
        if payload.is_empty() {
            return Err(MailError::InvalidParameter("empty payload"));
        }
        if !self.graph.contains(from) {
            return Err(MailError::OfficeNotFound(from));
        }
        if !self.graph.contains(to) {
            return Err(MailError::OfficeNotFound(to));
        }

        if from != to && !self.graph.are_connected(from, to) {
            self.graph.connect(from, to);
            self.record("edge_created", format!("auto edge {from} <-> {to}"));
        }

        // Admit the candidate id before appending the record, so a full or
        // exhausted origin rejects the send with no orphaned ledger entry.
        let candidate = self.ledger.next_id();
        if let Some(origin) = self.graph.find_mut(from) {
            origin.admit(candidate)?;
        }
        match self.ledger.append(category, priority, from, to, payload) {
            Ok(id) => {
                tracing::info!(letter = id, from, to, priority, "letter created");
                self.record(
                    "letter_created",
                    format!("letter {id} from {from} to {to} priority {priority}"),
                );
                Ok(id)
            }
            Err(e) => {
                if let Some(origin) = self.graph.find_mut(from) {
                    origin.release(candidate).ok();
                }
                Err(e)
            }
        }
    }

    /// Move a letter from one office's heap to another's.
    ///
    /// Decrements source occupancy, increments destination occupancy, and
    /// updates the letter's current-office field.
    ///
    /// # Errors
    ///
    /// [`MailError::LetterNotFound`] when the letter does not exist or is
    /// not queued at `from`, [`MailError::OfficeNotFound`] for a missing
    /// office, [`MailError::OfficeFull`] when `to` has no spare capacity.
    /// Failures leave both offices unchanged.
    pub fn transfer_letter(
        &mut self,
        letter_id: LetterId,
        from: OfficeId,
        to: OfficeId,
    ) -> Result<(), MailError> {
        if self.ledger.find(letter_id).is_none() {
            return Err(MailError::LetterNotFound(letter_id));
        }
        if !self.graph.contains(from) {
            return Err(MailError::OfficeNotFound(from));
        }
        match self.graph.find(to) {
            None => return Err(MailError::OfficeNotFound(to)),
            Some(office) if !office.has_spare_capacity() => {
                return Err(MailError::OfficeFull(to));
            }
            Some(_) => {}
        }

        let source = self.graph.find_mut(from).ok_or(MailError::OfficeNotFound(from))?;
        if !source.release(letter_id)? {
            return Err(MailError::LetterNotFound(letter_id));
        }
        if let Err(e) = self
            .graph
            .find_mut(to)
            .ok_or(MailError::OfficeNotFound(to))
            .and_then(|office| office.admit(letter_id))
        {
            // Put the letter back where it was; the hop did not happen.
            if let Some(source) = self.graph.find_mut(from) {
                source.admit(letter_id).ok();
            }
            return Err(e);
        }
        if let Some(letter) = self.ledger.find_mut(letter_id) {
            letter.current_office = to;
        }
        tracing::info!(letter = letter_id, from, to, "letter transferred");
        self.record(
            "letter_transferred",
            format!("letter {letter_id} moved {from} -> {to}"),
        );
        Ok(())
    }

    /// Mark a letter delivered at its current office, keeping it counted
    /// against that office's capacity forever.
    pub(crate) fn deliver_in_place(&mut self, letter_id: LetterId) -> Result<(), MailError> {
        let office_id = self
            .ledger
            .find(letter_id)
            .map(|l| l.current_office)
            .ok_or(MailError::LetterNotFound(letter_id))?;
        if let Some(letter) = self.ledger.find_mut(letter_id) {
            letter.state = LetterState::Delivered;
        }
        tracing::info!(letter = letter_id, office = office_id, "letter delivered");
        self.record(
            "letter_delivered",
            format!("letter {letter_id} delivered at office {office_id}"),
        );
        Ok(())
    }

    pub(crate) fn mark_undeliverable(&mut self, letter_id: LetterId, reason: &str) {
        if let Some(letter) = self.ledger.find_mut(letter_id) {
            if letter.state == LetterState::InTransit {
                letter.state = LetterState::Undeliverable;
                tracing::warn!(letter = letter_id, reason, "letter undeliverable");
                self.record(
                    "letter_undeliverable",
                    format!("letter {letter_id}: {reason}"),
                );
            }
        }
    }

    /// System-wide counters and per-office occupancy rows.
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        let offices = self
            .graph
            .offices()
            .iter()
            .map(|office| OfficeStatus {
                id: office.id(),
                capacity: office.capacity(),
                occupancy: office.occupancy(),
                neighbors: office.neighbors().to_vec(),
            })
            .collect();
        let mut in_transit = 0;
        let mut delivered = 0;
        let mut undeliverable = 0;
        for letter in self.ledger.letters() {
            match letter.state {
                LetterState::InTransit => in_transit += 1,
                LetterState::Delivered => delivered += 1,
                LetterState::Undeliverable => undeliverable += 1,
            }
        }
        SystemStatus {
            offices,
            letters_total: self.ledger.len(),
            in_transit,
            delivered,
            undeliverable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_letter_creates_edge_and_occupancy() {
        let mut system = MailSystem::new();
        system.add_office(1, 10, &[]).unwrap();
        system.add_office(2, 15, &[]).unwrap();
        let id = system
            .add_letter(LetterCategory::Ordinary, 5, 1, 2, "test data")
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(system.find_office(1).unwrap().occupancy(), 1);
        assert!(system.graph().are_connected(1, 2));
        assert!(system.graph().find(1).unwrap().is_neighbor(2));
        assert!(system.graph().find(2).unwrap().is_neighbor(1));
    }

    #[test]
    fn test_add_letter_validation() {
        let mut system = MailSystem::new();
        system.add_office(1, 10, &[]).unwrap();
        system.add_office(2, 10, &[]).unwrap();
        assert_eq!(
            system.add_letter(LetterCategory::Ordinary, -1, 1, 2, "x"),
            Err(MailError::InvalidParameter("negative priority"))
        );
        assert_eq!(
            system.add_letter(LetterCategory::Ordinary, 5, 1, 2, ""),
            Err(MailError::InvalidParameter("empty payload"))
        );
        assert_eq!(
            system.add_letter(LetterCategory::Ordinary, 5, 999, 2, "x"),
            Err(MailError::OfficeNotFound(999))
        );
        assert_eq!(
            system.add_letter(LetterCategory::Ordinary, 5, 1, 999, "x"),
            Err(MailError::OfficeNotFound(999))
        );
        assert!(system.ledger().is_empty());
    }

    #[test]
    fn test_add_letter_full_origin_is_atomic() {
        let mut system = MailSystem::new();
        system.add_office(3, 2, &[]).unwrap();
        system
            .add_letter(LetterCategory::Ordinary, 1, 3, 3, "filler 1")
            .unwrap();
        system
            .add_letter(LetterCategory::Ordinary, 2, 3, 3, "filler 2")
            .unwrap();
        assert_eq!(
            system.add_letter(LetterCategory::Ordinary, 3, 3, 3, "overflow"),
            Err(MailError::OfficeFull(3))
        );
        // Atomic rejection: no orphaned record, no consumed id.
        assert_eq!(system.find_office(3).unwrap().occupancy(), 2);
        assert_eq!(system.ledger().len(), 2);
        assert_eq!(system.ledger().next_id(), 3);
    }

    #[test]
    fn test_transfer_letter_moves_occupancy() {
        let mut system = MailSystem::new();
        system.add_office(1, 10, &[]).unwrap();
        system.add_office(2, 15, &[]).unwrap();
        let id = system
            .add_letter(LetterCategory::Ordinary, 5, 1, 2, "transfer test")
            .unwrap();
        system.transfer_letter(id, 1, 2).unwrap();
        assert_eq!(system.find_office(1).unwrap().occupancy(), 0);
        assert_eq!(system.find_office(2).unwrap().occupancy(), 1);
        assert_eq!(system.find_letter(id).unwrap().current_office, 2);
    }

    #[test]
    fn test_transfer_letter_to_full_office() {
        let mut system = MailSystem::new();
        system.add_office(1, 10, &[]).unwrap();
        system.add_office(3, 2, &[]).unwrap();
        let id = system
            .add_letter(LetterCategory::Ordinary, 5, 1, 3, "to a full office")
            .unwrap();
        system
            .add_letter(LetterCategory::Ordinary, 1, 3, 1, "filler 1")
            .unwrap();
        system
            .add_letter(LetterCategory::Ordinary, 2, 3, 1, "filler 2")
            .unwrap();
        assert_eq!(
            system.transfer_letter(id, 1, 3),
            Err(MailError::OfficeFull(3))
        );
        assert_eq!(system.find_office(1).unwrap().occupancy(), 1);
        assert_eq!(system.find_office(3).unwrap().occupancy(), 2);
        assert_eq!(system.find_letter(id).unwrap().current_office, 1);
    }

    #[test]
    fn test_remove_office_marks_endpoint_letters_undeliverable() {
        let mut system = MailSystem::new();
        system.add_office(1, 10, &[]).unwrap();
        system.add_office(2, 15, &[]).unwrap();
        let outbound = system
            .add_letter(LetterCategory::Ordinary, 5, 1, 2, "to office 2")
            .unwrap();
        let local = system
            .add_letter(LetterCategory::Ordinary, 3, 1, 1, "to office 1 itself")
            .unwrap();
        system.remove_office(1).unwrap();
        assert_eq!(
            system.find_letter(outbound).unwrap().state,
            LetterState::Undeliverable
        );
        assert_eq!(
            system.find_letter(local).unwrap().state,
            LetterState::Undeliverable
        );
        assert!(system.find_office(1).is_none());
        assert!(system.find_office(2).is_some());
        assert!(system.graph().find(2).unwrap().neighbors().is_empty());
    }

    #[test]
    fn test_remove_office_reroutes_through_neighbor() {
        let mut system = MailSystem::new();
        system.add_office(1, 10, &[]).unwrap();
        system.add_office(2, 15, &[1]).unwrap();
        system.add_office(3, 15, &[2]).unwrap();
        // Letter from 1 to 3, currently forwarded to office 2.
        let id = system
            .add_letter(LetterCategory::Ordinary, 5, 1, 3, "via office 2")
            .unwrap();
        system.transfer_letter(id, 1, 2).unwrap();
        system.remove_office(2).unwrap();
        let letter = system.find_letter(id).unwrap();
        assert_eq!(letter.state, LetterState::InTransit);
        // First neighbor of office 2 with spare room, in adjacency order.
        assert_eq!(letter.current_office, 1);
        assert_eq!(system.find_office(1).unwrap().occupancy(), 1);
    }

    #[test]
    fn test_remove_missing_office() {
        let mut system = MailSystem::new();
        assert_eq!(system.remove_office(999), Err(MailError::OfficeNotFound(999)));
    }

    #[test]
    fn test_status_counts() {
        let mut system = MailSystem::new();
        system.add_office(1, 10, &[]).unwrap();
        system.add_office(2, 15, &[]).unwrap();
        system
            .add_letter(LetterCategory::Ordinary, 5, 1, 2, "letter a")
            .unwrap();
        system
            .add_letter(LetterCategory::Urgent, 9, 2, 1, "letter b")
            .unwrap();
        let status = system.status();
        assert_eq!(status.letters_total, 2);
        assert_eq!(status.in_transit, 2);
        assert_eq!(status.delivered, 0);
        assert_eq!(status.offices.len(), 2);
        assert_eq!(status.offices[0].occupancy, 1);
    }
}
