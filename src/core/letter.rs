//! Letter records and the append-only letter ledger.

use serde::{Deserialize, Serialize};

use crate::core::error::MailError;
use crate::core::office::OfficeId;

/// Identifier of a letter, assigned sequentially starting at 1.
///
/// Zero is never assigned; it would collide with "no value" sentinels in
/// systems this simulator models.
pub type LetterId = u64;

/// Maximum payload size in bytes; longer payloads are truncated.
pub const MAX_PAYLOAD_BYTES: usize = 256;

/// Service category of a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterCategory {
    /// Regular postal service.
    Ordinary,
    /// Urgent postal service.
    Urgent,
}

/// Lifecycle state of a letter.
///
/// State only moves forward: `InTransit` may become `Delivered` or
/// `Undeliverable`, and both of those are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterState {
    /// Still being routed toward its destination.
    InTransit,
    /// Arrived at its destination office; permanently occupies a slot there.
    Delivered,
    /// Can never reach its destination (endpoint removed or no route).
    Undeliverable,
}

/// A routable letter record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Letter {
    /// Unique id, assigned once at creation, never reused.
    pub id: LetterId,
    /// Service category.
    pub category: LetterCategory,
    /// Lifecycle state.
    pub state: LetterState,
    /// Caller-supplied priority score; higher is dispatched sooner.
    pub priority: i32,
    /// Office the letter was posted from.
    pub origin: OfficeId,
    /// Office the letter is addressed to.
    pub destination: OfficeId,
    /// Office the letter is physically at right now.
    pub current_office: OfficeId,
    /// Opaque payload, truncated to [`MAX_PAYLOAD_BYTES`].
    pub payload: String,
}

impl Letter {
    /// Whether the letter is still routable.
    #[must_use]
    pub fn is_in_transit(&self) -> bool {
        self.state == LetterState::InTransit
    }
}

/// Append-only registry of letters with a monotonic id generator.
///
/// Records are never deleted and never revert state. Lookup is a linear
/// scan, which is fine at the letter counts this simulator targets.
#[derive(Debug)]
pub struct LetterLedger {
    letters: Vec<Letter>,
    next_id: LetterId,
}

impl Default for LetterLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LetterLedger {
    /// Create an empty ledger; the first allocated id will be 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            letters: Vec::new(),
            next_id: 1,
        }
    }

    /// The id the next appended letter will receive.
    #[must_use]
    pub fn next_id(&self) -> LetterId {
        self.next_id
    }

    /// Number of letters ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Whether no letters have been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// All letters, in creation order.
    #[must_use]
    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    /// Find a letter by id.
    #[must_use]
    pub fn find(&self, id: LetterId) -> Option<&Letter> {
        self.letters.iter().find(|l| l.id == id)
    }

    /// Find a letter by id, mutably.
    pub fn find_mut(&mut self, id: LetterId) -> Option<&mut Letter> {
        self.letters.iter_mut().find(|l| l.id == id)
    }

    /// Append a new in-transit letter and return its id.
    ///
    /// Validation (priority, payload) is the caller's job; this only
    /// allocates the id and stores the record. The payload is truncated to
    /// [`MAX_PAYLOAD_BYTES`] on a character boundary.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::ResourceExhausted`] if ledger storage cannot
    /// grow; no id is consumed in that case.
    pub fn append(
        &mut self,
        category: LetterCategory,
        priority: i32,
        origin: OfficeId,
        destination: OfficeId,
        payload: &str,
    ) -> Result<LetterId, MailError> {
        if self.letters.len() == self.letters.capacity() {
            self.letters
                .try_reserve(1)
                .map_err(|_| MailError::ResourceExhausted)?;
        }
        let id = self.next_id;
        self.letters.push(Letter {
            id,
            category,
            state: LetterState::InTransit,
            priority,
            origin,
            destination,
            current_office: origin,
            payload: truncate_payload(payload),
        });
        self.next_id += 1;
        Ok(id)
    }
}

/// Truncate a payload to [`MAX_PAYLOAD_BYTES`] without splitting a character.
fn truncate_payload(payload: &str) -> String {
    if payload.len() <= MAX_PAYLOAD_BYTES {
        return payload.to_owned();
    }
    let mut end = MAX_PAYLOAD_BYTES;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    payload[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut ledger = LetterLedger::new();
        let a = ledger
            .append(LetterCategory::Ordinary, 5, 1, 2, "a")
            .unwrap();
        let b = ledger.append(LetterCategory::Urgent, 9, 2, 1, "b").unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(ledger.next_id(), 3);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_new_letter_is_in_transit_at_origin() {
        let mut ledger = LetterLedger::new();
        let id = ledger
            .append(LetterCategory::Ordinary, 5, 3, 7, "hello")
            .unwrap();
        let letter = ledger.find(id).unwrap();
        assert_eq!(letter.state, LetterState::InTransit);
        assert_eq!(letter.current_office, 3);
        assert_eq!(letter.origin, 3);
        assert_eq!(letter.destination, 7);
        assert_eq!(letter.payload, "hello");
    }

    #[test]
    fn test_find_missing_letter() {
        let ledger = LetterLedger::new();
        assert!(ledger.find(999).is_none());
    }

    #[test]
    fn test_payload_truncated_on_char_boundary() {
        let mut ledger = LetterLedger::new();
        // 300 bytes of multi-byte characters.
        let long = "é".repeat(150);
        let id = ledger
            .append(LetterCategory::Ordinary, 1, 1, 2, &long)
            .unwrap();
        let stored = &ledger.find(id).unwrap().payload;
        assert!(stored.len() <= MAX_PAYLOAD_BYTES);
        assert!(stored.chars().all(|c| c == 'é'));
    }
}
