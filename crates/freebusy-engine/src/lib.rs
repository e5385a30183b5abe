//! # freebusy-engine
//!
//! Free/busy aggregation for groupware calendars.
//!
//! Calendar items intersecting a time window are fetched from a store,
//! recurring items are expanded into concrete occurrences, and the occurrences
//! are merged by an interval sweep into a minimal, ordered list of
//! non-overlapping busy blocks. Each block carries the subjects of every item
//! active during it and the highest busy status among them; free blocks are
//! dropped. The blocks are then handed to a publishing sink.
//!
//! ```rust
//! use freebusy_engine::{merge, BusyStatus, Occurrence};
//!
//! let blocks = merge(&[
//!     Occurrence::new(10, 20, "A", BusyStatus::BUSY),
//!     Occurrence::new(15, 25, "B", BusyStatus::TENTATIVE),
//! ]);
//! assert_eq!(blocks.len(), 3);
//! assert_eq!(blocks[1].subjects, vec!["A", "B"]);
//! assert_eq!(blocks[2].status, BusyStatus::TENTATIVE);
//! ```
//!
//! Concurrently active occurrences are tracked by their position in the input,
//! not by subject and status. Ending one of two identical occurrences always
//! removes that exact occurrence.
//!
//! ## Modules
//!
//! - [`merger`] -- occurrences → merged busy intervals
//! - [`slots`] -- free slots between merged intervals inside a window
//! - [`expander`] -- RRULE expansion of recurring items
//! - [`restriction`] -- store query predicates and the calendar window query
//! - [`store`] -- calendar store seam and an in-memory store
//! - [`publish`] -- store → expand → merge → sink pipeline
//! - [`error`] -- Error types

pub mod error;
pub mod expander;
pub mod item;
pub mod merger;
pub mod occurrence;
pub mod publish;
pub mod restriction;
pub mod slots;
pub mod status;
pub mod store;

pub use error::FreeBusyError;
pub use expander::{expand_instances, RRuleExpander, RecurrenceExpander};
pub use item::{CalendarItem, Recurrence};
pub use merger::{merge, MergedInterval};
pub use occurrence::{Occurrence, TimeWindow};
pub use publish::{Account, FreeBusyPublisher, FreeBusySink, MemorySink, PublishReport};
pub use restriction::{window_restriction, PropTag, PropValue, PropertyRow, RelOp, Restriction};
pub use slots::{first_free_slot, free_slots, FreeSlot};
pub use status::BusyStatus;
pub use store::{CalendarStore, MemoryStore};
