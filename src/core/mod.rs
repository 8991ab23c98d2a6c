//! Routing core: heap, offices, letter ledger, policies, and journal.

pub mod error;
pub mod heap;
pub mod journal;
pub mod letter;
pub mod office;
pub mod routing;
pub mod system;

pub use error::{AppResult, MailError};
pub use heap::MinHeap;
pub use journal::{FileJournal, InMemoryJournal, JournalEvent, JournalSink};
pub use letter::{Letter, LetterCategory, LetterId, LetterLedger, LetterState, MAX_PAYLOAD_BYTES};
pub use office::{Office, OfficeGraph, OfficeId, HEAP_SEED_CAPACITY, MAX_NEIGHBORS};
pub use system::{MailSystem, OfficeStatus, SystemStatus};
