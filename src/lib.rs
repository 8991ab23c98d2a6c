//! # Mail Relay
//!
//! A store-and-forward routing simulator for discrete letters moving through
//! a network of capacity-bounded post offices.
//!
//! The simulation is built from three tightly coupled pieces:
//!
//! - **`MinHeap`**: a growable, array-backed binary minimum-heap with
//!   arbitrary-value removal. Each office owns one, keyed by raw letter id,
//!   so minimum extraction is oldest-first among the letters physically
//!   present at that office.
//! - **Office graph**: capacity-bounded nodes linked by a best-effort
//!   symmetric adjacency list (capped per office). Creating a letter between
//!   two unconnected offices grows the topology automatically.
//! - **Routing policies**: two schedulers that move letters hop-by-hop
//!   toward their destination. [`core::routing::advance_local`] makes at
//!   most one move per office per call; [`core::routing::advance_global`]
//!   ranks every in-transit letter system-wide and commits at most one move
//!   per call.
//!
//! ## Mailbox semantics
//!
//! Delivery never releases capacity: a delivered letter stays in its final
//! office's heap forever and keeps consuming one capacity unit. This is the
//! intended mailbox behavior, and the occupancy counter always equals the
//! number of ids in the heap, delivered letters included.
//!
//! ## Example
//!
//! ```rust
//! use mail_relay::core::{LetterCategory, MailSystem};
//! use mail_relay::core::routing::advance_local;
//!
//! let mut system = MailSystem::new();
//! system.add_office(1, 10, &[]).unwrap();
//! system.add_office(2, 15, &[]).unwrap();
//!
//! // Creating the letter auto-connects offices 1 and 2.
//! let id = system
//!     .add_letter(LetterCategory::Ordinary, 5, 1, 2, "invoice #42")
//!     .unwrap();
//! assert_eq!(id, 1);
//!
//! // One round-robin pass moves the letter to office 2, the next delivers it.
//! advance_local(&mut system).unwrap();
//! advance_local(&mut system).unwrap();
//! ```
//!
//! The interactive driver binary `mailsim` exercises the same API from a
//! menu loop; see `src/bin/mailsim.rs`.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Routing core: heap, offices, ledger, policies, journal.
pub mod core;
/// Configuration models for the simulation driver.
pub mod config;
/// Adapters consuming the core (report exporters).
pub mod infra;
/// Shared utilities.
pub mod util;
