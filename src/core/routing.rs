//! Routing policies moving letters hop-by-hop toward their destination.
//!
//! Two schedulers share the same primitives (snapshot an office heap,
//! priority-sort, deliver or transfer) but differ in scope:
//!
//! - [`advance_local`]: per-office round-robin. Each office gets at most
//!   one state change per call.
//! - [`advance_global`]: system-wide single dispatch. The whole call
//!   commits at most one state change.
//!
//! Both sort by descending priority and break ties by ascending letter id
//! (oldest first). The tie-break is part of the contract and is pinned by
//! the integration tests.

use crate::core::error::MailError;
use crate::core::letter::LetterId;
use crate::core::office::{Office, OfficeId};
use crate::core::system::MailSystem;

/// Score awarded to a direct hop into the destination office.
const DIRECT_HOP_SCORE: i64 = 1000;
/// Score awarded to a neighbor that is itself adjacent to the destination.
const ADJACENT_TO_DEST_SCORE: i64 = 100;
/// Base of the id-proximity heuristic (`10 - |neighbor - destination|`).
///
/// This is id-distance, not graph distance; on arbitrarily numbered
/// topologies it can mis-rank hops, which the simulation accepts.
const PROXIMITY_BASE: i64 = 10;

/// Sortable view of one queued letter.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: LetterId,
    priority: i32,
    office: OfficeId,
}

/// Sort candidates by descending priority, ascending id on ties.
fn sort_by_priority(candidates: &mut [Candidate]) {
    candidates.sort_unstable_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
}

/// Snapshot one office's queue as sortable candidates, leaving it intact.
fn collect_candidates(
    system: &mut MailSystem,
    office: OfficeId,
) -> Result<Vec<Candidate>, MailError> {
    let ids = system
        .graph_mut()
        .find_mut(office)
        .ok_or(MailError::OfficeNotFound(office))?
        .snapshot_letters()?;
    Ok(ids
        .into_iter()
        .filter_map(|id| {
            system.ledger().find(id).map(|letter| Candidate {
                id,
                priority: letter.priority,
                office,
            })
        })
        .collect())
}

/// Per-office round-robin pass (Policy A).
///
/// Visits every office in graph order. For each, the queued letters are
/// examined in descending-priority order and the first one still in
/// transit is acted on: delivered in place when it is already at its
/// destination, otherwise moved to the destination directly if it has
/// spare capacity, else to the first neighbor with spare capacity, else
/// left queued for a future pass. At most one state change per office per
/// call.
///
/// Returns the number of letters delivered or moved.
///
/// # Errors
///
/// Propagates [`MailError::ResourceExhausted`] from heap maintenance;
/// individual full-office conditions are routing outcomes, not errors.
pub fn advance_local(system: &mut MailSystem) -> Result<usize, MailError> {
    let mut changes = 0;
    for office_id in system.graph().office_ids() {
        let mut candidates = collect_candidates(system, office_id)?;
        sort_by_priority(&mut candidates);
        for candidate in candidates {
            let Some(letter) = system.ledger().find(candidate.id) else {
                continue;
            };
            if !letter.is_in_transit() {
                continue;
            }
            let destination = letter.destination;
            if destination == office_id {
                system.deliver_in_place(candidate.id)?;
                changes += 1;
            } else if let Some(target) = pick_local_hop(system, office_id, destination) {
                system.transfer_letter(candidate.id, office_id, target)?;
                changes += 1;
            } else {
                tracing::debug!(
                    letter = candidate.id,
                    office = office_id,
                    "no hop with spare capacity; letter stays queued"
                );
            }
            // One examined in-transit letter per office per pass.
            break;
        }
    }
    Ok(changes)
}

/// Policy A hop choice: the destination itself when it has room, else the
/// first neighbor in adjacency order with room.
fn pick_local_hop(
    system: &MailSystem,
    office: OfficeId,
    destination: OfficeId,
) -> Option<OfficeId> {
    if system
        .graph()
        .find(destination)
        .is_some_and(Office::has_spare_capacity)
    {
        return Some(destination);
    }
    let current = system.graph().find(office)?;
    current
        .neighbors()
        .iter()
        .copied()
        .find(|&neighbor| {
            system
                .graph()
                .find(neighbor)
                .is_some_and(Office::has_spare_capacity)
        })
}

/// Global single-dispatch pass (Policy B).
///
/// Collects every in-transit letter across every office, sorts the whole
/// collection by descending priority (ascending id on ties), and walks it
/// until one state change commits: a delivery in place, or a transfer to
/// the best-scored next hop. Letters with no viable hop are skipped, so a
/// call may finish having moved nothing.
///
/// Returns whether a state change was committed.
///
/// # Errors
///
/// Propagates [`MailError::ResourceExhausted`] from heap maintenance.
pub fn advance_global(system: &mut MailSystem) -> Result<bool, MailError> {
    let mut candidates = Vec::new();
    for office_id in system.graph().office_ids() {
        candidates.extend(collect_candidates(system, office_id)?);
    }
    sort_by_priority(&mut candidates);

    for candidate in candidates {
        let Some(letter) = system.ledger().find(candidate.id) else {
            continue;
        };
        if !letter.is_in_transit() {
            continue;
        }
        let destination = letter.destination;
        if destination == candidate.office {
            system.deliver_in_place(candidate.id)?;
            return Ok(true);
        }
        if let Some((target, score)) = pick_scored_hop(system, candidate.office, destination) {
            tracing::debug!(letter = candidate.id, target, score, "global dispatch hop");
            system.transfer_letter(candidate.id, candidate.office, target)?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Policy B hop choice, returning the winning hop with its score.
///
/// The destination itself short-circuits at [`DIRECT_HOP_SCORE`] when it
/// has spare capacity; no neighbor is allowed to outbid a direct hop.
/// Otherwise every neighbor with spare capacity is scored
/// `100·[adjacent to destination] + (10 − |id distance|) + free capacity`;
/// the highest score wins and the first-seen neighbor keeps a tie.
fn pick_scored_hop(
    system: &MailSystem,
    office: OfficeId,
    destination: OfficeId,
) -> Option<(OfficeId, i64)> {
    if system
        .graph()
        .find(destination)
        .is_some_and(Office::has_spare_capacity)
    {
        return Some((destination, DIRECT_HOP_SCORE));
    }
    let current = system.graph().find(office)?;
    let mut best: Option<(OfficeId, i64)> = None;
    for &neighbor in current.neighbors() {
        let Some(target) = system.graph().find(neighbor) else {
            continue;
        };
        if !target.has_spare_capacity() {
            continue;
        }
        let mut score = if system.graph().are_connected(neighbor, destination) {
            ADJACENT_TO_DEST_SCORE
        } else {
            0
        };
        score += PROXIMITY_BASE - (i64::from(neighbor) - i64::from(destination)).abs();
        score += i64::from(target.free_capacity());
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((neighbor, score));
        }
    }
    best
}
