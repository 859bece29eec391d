//! Service queue with recyclable buzzers and O(1) removal from anywhere.
//!
//! A [`ServiceQueue`] hands out integer *buzzers*, keeps them in line in
//! arrival order, serves from the front, and can remove or promote any
//! buzzer in O(1) given only its id. Released buzzers are reused before new
//! ones are minted.
//!
//! # Design
//!
//! Storage is separated from structure:
//!
//! ```text
//! Directory (storage)   - owns one node per buzzer ever issued, indexed by id
//! Sequence  (structure) - head/tail/len; nodes carry their own prev/next keys
//! ```
//!
//! The queue runs two sequences over one directory: the *line* and the
//! *idle* bin. Releasing a buzzer moves its node from one to the other; it is
//! never freed while the queue is alive. Because the buzzer id *is* the
//! directory key, finding a node is an array index and splicing it out is a
//! handful of link writes.
//!
//! # Quick Start
//!
//! ```
//! use nexus_sq::{Buzzer, ServiceQueue};
//!
//! let mut q = ServiceQueue::new();
//! assert_eq!(q.give_buzzer(), Buzzer::new(0));
//! assert_eq!(q.give_buzzer(), Buzzer::new(1));
//! assert_eq!(q.give_buzzer(), Buzzer::new(2));
//!
//! assert!(q.kick_out(Buzzer::new(1)));   // leave the line from the middle
//! assert!(q.take_bribe(Buzzer::new(2))); // jump to the front
//! assert_eq!(q.display().to_string(), "[2 0]");
//!
//! assert_eq!(q.seat(), Some(Buzzer::new(2)));
//! assert_eq!(q.seat(), Some(Buzzer::new(0)));
//! assert_eq!(q.seat(), None);
//! ```
//!
//! # Building Blocks
//!
//! [`Sequence`] and [`Directory`] are public and usable on their own:
//!
//! | Type | Role | Key Operations |
//! |------|------|----------------|
//! | [`Directory`] | Append-only storage, doubling growth | O(1) amortized insert, O(1) get |
//! | [`Sequence`] | Doubly-linked list over any [`Storage`] | O(1) link/splice/move |
//! | [`ServiceQueue`] | Buzzer allocator | O(1) give/seat/kick/bribe |
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab`

#![warn(missing_docs)]

pub mod key;
pub mod list;
pub mod queue;
pub mod storage;

pub use key::{Buzzer, InvalidBuzzer, Key, SEAT_NONE};
pub use list::{ListNode, Sequence};
pub use queue::{BuzzerStatus, ServiceQueue};
pub use storage::{Directory, Storage, UnboundedStorage};

#[cfg(feature = "slab")]
pub use list::SlabSequenceStorage;
