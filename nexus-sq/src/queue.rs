//! Service queue: a waiting line of recyclable buzzers.
//!
//! Every buzzer ever handed out owns one node in a [`Directory`], indexed by
//! the buzzer's id. The node is linked into exactly one of two sequences:
//! the *line* (waiting, front is served next) or the *idle* bin (released,
//! ready for reuse). Lookups by buzzer go straight through the directory, so
//! kicking out or promoting an arbitrary buzzer never walks the line.
//!
//! | Operation | Cost |
//! |-----------|------|
//! | [`give_buzzer`](ServiceQueue::give_buzzer) | O(1) amortized |
//! | [`seat`](ServiceQueue::seat) | O(1) |
//! | [`kick_out`](ServiceQueue::kick_out) | O(1) |
//! | [`take_bribe`](ServiceQueue::take_bribe) | O(1) |
//! | [`len`](ServiceQueue::len) | O(1) |
//! | [`display`](ServiceQueue::display) | O(n) |
//! | drop | O(buzzers ever issued) |

use core::fmt;

use log::trace;

use crate::{Buzzer, Directory, ListNode, Sequence, Storage};

type Nodes = Directory<ListNode<Ticket, Buzzer>, Buzzer>;
type Line = Sequence<Ticket, Nodes, Buzzer>;

/// Per-buzzer state stored in the directory.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    buzzer: Buzzer,
    /// `true` while linked into the line, `false` while idle.
    waiting: bool,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.buzzer, f)
    }
}

/// Where a buzzer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerStatus {
    /// Never handed out by this queue.
    Unissued,
    /// In line.
    Waiting,
    /// Handed out before, now released and available for reuse.
    Idle,
}

/// A service queue handing out reusable buzzers.
///
/// # Example
///
/// ```
/// use nexus_sq::{Buzzer, ServiceQueue};
///
/// let mut q = ServiceQueue::new();
/// let a = q.give_buzzer();
/// let b = q.give_buzzer();
/// let c = q.give_buzzer();
/// assert_eq!((a.get(), b.get(), c.get()), (0, 1, 2));
///
/// assert!(q.kick_out(b));
/// assert!(q.take_bribe(c));
/// assert_eq!(q.display().to_string(), "[2 0]");
///
/// // The kicked-out buzzer is reused before a new one is minted.
/// assert_eq!(q.give_buzzer(), b);
/// assert_eq!(q.seat(), Some(c));
/// assert_eq!(q.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ServiceQueue {
    nodes: Nodes,
    line: Line,
    idle: Line,
}

impl ServiceQueue {
    /// Creates an empty queue. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self {
            nodes: Directory::new(),
            line: Sequence::new(),
            idle: Sequence::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` buzzers before the
    /// directory has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Directory::with_capacity(capacity),
            line: Sequence::new(),
            idle: Sequence::new(),
        }
    }

    /// Returns the number of buzzers in line.
    #[inline]
    pub const fn len(&self) -> usize {
        self.line.len()
    }

    /// Returns `true` if nobody is in line.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Returns the number of released buzzers waiting to be reused.
    #[inline]
    pub const fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Returns the number of distinct buzzers this queue has ever minted.
    #[inline]
    pub fn issued(&self) -> usize {
        self.nodes.len()
    }

    /// Returns how many buzzers fit before the directory grows again.
    #[inline]
    pub fn directory_capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the buzzer at the front of the line.
    #[inline]
    pub fn front(&self) -> Option<Buzzer> {
        self.line.front_key()
    }

    /// Returns the buzzer at the back of the line.
    #[inline]
    pub fn back(&self) -> Option<Buzzer> {
        self.line.back_key()
    }

    /// Reports where `buzzer` is. Ids this queue never minted are
    /// [`BuzzerStatus::Unissued`].
    #[inline]
    pub fn status(&self, buzzer: Buzzer) -> BuzzerStatus {
        match self.nodes.get(buzzer) {
            None => BuzzerStatus::Unissued,
            Some(node) if node.data.waiting => BuzzerStatus::Waiting,
            Some(_) => BuzzerStatus::Idle,
        }
    }

    /// Returns `true` if `buzzer` is in line.
    #[inline]
    pub fn contains(&self, buzzer: Buzzer) -> bool {
        self.status(buzzer) == BuzzerStatus::Waiting
    }

    /// Returns the buzzers in line, front to back.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Buzzer> + '_ {
        self.line.keys(&self.nodes)
    }

    /// Renders the line front to back as `[a b c]`.
    #[inline]
    pub fn display(&self) -> impl fmt::Display + '_ {
        self.line.display(&self.nodes)
    }

    /// Hands out a buzzer and puts it at the back of the line.
    ///
    /// A released buzzer is reused if there is one (oldest release first).
    /// Otherwise the next unused id is minted, which is always
    /// [`issued()`](Self::issued); the directory doubles when full.
    ///
    /// # Panics
    ///
    /// Panics if `u32::MAX - 1` buzzers are already in circulation.
    pub fn give_buzzer(&mut self) -> Buzzer {
        if let Some(buzzer) = self.idle.pop_front(&mut self.nodes) {
            self.ticket_mut(buzzer).waiting = true;
            self.line.link_back(&mut self.nodes, buzzer);
            trace!("reissued buzzer {buzzer}, line length {}", self.line.len());
            return buzzer;
        }

        let buzzer = self.nodes.next_key();
        let key = self.line.push_back(
            &mut self.nodes,
            Ticket {
                buzzer,
                waiting: true,
            },
        );
        debug_assert_eq!(key, buzzer);
        trace!("minted buzzer {buzzer}, line length {}", self.line.len());
        buzzer
    }

    /// Serves the front of the line and releases its buzzer for reuse.
    ///
    /// Returns `None` (leaving the queue untouched) if nobody is waiting.
    pub fn seat(&mut self) -> Option<Buzzer> {
        let buzzer = self.line.pop_front(&mut self.nodes)?;
        self.release(buzzer);
        trace!("seated buzzer {buzzer}");
        Some(buzzer)
    }

    /// Removes `buzzer` from wherever it stands in line and releases it.
    ///
    /// Returns `false`, with no change, if `buzzer` was never issued or is
    /// not currently in line.
    pub fn kick_out(&mut self, buzzer: Buzzer) -> bool {
        if !self.contains(buzzer) {
            return false;
        }

        self.line.splice_out(&mut self.nodes, buzzer);
        self.release(buzzer);
        trace!("kicked out buzzer {buzzer}");
        true
    }

    /// Moves `buzzer` to the front of the line.
    ///
    /// Returns `false`, with no change, if `buzzer` was never issued or is
    /// not currently in line. The line length never changes.
    pub fn take_bribe(&mut self, buzzer: Buzzer) -> bool {
        if !self.contains(buzzer) {
            return false;
        }

        self.line.move_to_front(&mut self.nodes, buzzer);
        trace!("buzzer {buzzer} moved to the front");
        true
    }

    /// Drops every buzzer and starts over from id 0.
    ///
    /// Directory capacity is kept.
    pub fn clear(&mut self) {
        self.line.reset();
        self.idle.reset();
        self.nodes.clear();
    }

    fn release(&mut self, buzzer: Buzzer) {
        self.ticket_mut(buzzer).waiting = false;
        self.idle.link_back(&mut self.nodes, buzzer);
    }

    #[inline]
    fn ticket_mut(&mut self, buzzer: Buzzer) -> &mut Ticket {
        // Safety: only called with keys taken from the line or idle bin,
        // and every linked key indexes a directory entry.
        unsafe { &mut self.nodes.get_unchecked_mut(buzzer).data }
    }
}

impl fmt::Display for ServiceQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(id: u32) -> Buzzer {
        Buzzer::new(id)
    }

    fn line(q: &ServiceQueue) -> Vec<u32> {
        q.iter().map(Buzzer::get).collect()
    }

    /// Checks the structural invariants tying the directory to both sequences.
    fn assert_consistent(q: &ServiceQueue) {
        let waiting: Vec<_> = q.line.keys(&q.nodes).collect();
        let idle: Vec<_> = q.idle.keys(&q.nodes).collect();

        assert_eq!(waiting.len(), q.len());
        assert_eq!(idle.len(), q.idle());
        assert_eq!(waiting.len() + idle.len(), q.issued());

        for &buzzer in &waiting {
            assert_eq!(q.status(buzzer), BuzzerStatus::Waiting);
        }
        for &buzzer in &idle {
            assert_eq!(q.status(buzzer), BuzzerStatus::Idle);
        }

        let mut all: Vec<_> = waiting.iter().chain(&idle).map(|b| b.get()).collect();
        all.sort_unstable();
        let expected: Vec<u32> = (0..q.issued() as u32).collect();
        assert_eq!(all, expected);

        if q.idle() == 0 {
            let mut sorted = line(q);
            sorted.sort_unstable();
            assert_eq!(sorted, (0..q.len() as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn new_queue_is_empty() {
        let q = ServiceQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert_eq!(q.issued(), 0);
        assert_eq!(q.directory_capacity(), 0);
        assert_eq!(q.front(), None);
        assert_eq!(q.display().to_string(), "[]");
    }

    #[test]
    fn fresh_buzzers_count_up_from_zero() {
        let mut q = ServiceQueue::new();
        for i in 0..100 {
            assert_eq!(q.give_buzzer(), b(i));
        }
        assert_eq!(q.len(), 100);
        assert_consistent(&q);
    }

    #[test]
    fn walkthrough() {
        let mut q = ServiceQueue::new();
        assert_eq!(q.give_buzzer(), b(0));
        assert_eq!(q.give_buzzer(), b(1));
        assert_eq!(q.give_buzzer(), b(2));
        assert_eq!(q.display().to_string(), "[0 1 2]");

        assert!(q.kick_out(b(1)));
        assert_eq!(q.display().to_string(), "[0 2]");

        assert!(q.take_bribe(b(2)));
        assert_eq!(q.display().to_string(), "[2 0]");

        assert_eq!(q.give_buzzer(), b(1));
        assert_eq!(q.display().to_string(), "[2 0 1]");

        assert_eq!(q.seat(), Some(b(2)));
        assert_eq!(q.len(), 2);
        assert_consistent(&q);
    }

    #[test]
    fn empty_queue_refusals() {
        let mut q = ServiceQueue::new();
        assert_eq!(q.seat(), None);
        assert!(!q.kick_out(b(5)));
        assert!(!q.take_bribe(b(0)));
        assert_eq!(q.len(), 0);
        assert_eq!(q.issued(), 0);
    }

    #[test]
    fn seat_on_empty_is_idempotent() {
        let mut q = ServiceQueue::new();
        q.give_buzzer();
        q.seat();
        for _ in 0..5 {
            assert_eq!(q.seat(), None);
            assert_eq!(q.len(), 0);
        }
        assert_consistent(&q);
    }

    #[test]
    fn seat_then_reissue_reuses() {
        let mut q = ServiceQueue::new();
        let t = q.give_buzzer();
        assert_eq!(q.seat(), Some(t));
        assert_eq!(q.status(t), BuzzerStatus::Idle);
        assert_eq!(q.give_buzzer(), t);
        assert_eq!(q.issued(), 1);
    }

    #[test]
    fn kick_out_twice() {
        let mut q = ServiceQueue::new();
        q.give_buzzer();
        let t = q.give_buzzer();
        q.give_buzzer();

        assert!(q.kick_out(t));
        assert!(!q.kick_out(t));
        assert_eq!(line(&q), vec![0, 2]);
        assert_consistent(&q);
    }

    #[test]
    fn kick_out_front_and_back() {
        let mut q = ServiceQueue::new();
        for _ in 0..4 {
            q.give_buzzer();
        }

        assert!(q.kick_out(b(0)));
        assert_eq!(q.front(), Some(b(1)));
        assert!(q.kick_out(b(3)));
        assert_eq!(q.back(), Some(b(2)));
        assert_eq!(line(&q), vec![1, 2]);
        assert_consistent(&q);

        assert!(q.kick_out(b(1)));
        assert!(q.kick_out(b(2)));
        assert!(q.is_empty());
        assert_consistent(&q);
    }

    #[test]
    fn bribe_for_idle_buzzer_is_refused() {
        let mut q = ServiceQueue::new();
        q.give_buzzer();
        q.give_buzzer();
        q.give_buzzer();
        q.kick_out(b(1));

        let before = q.display().to_string();
        assert!(!q.take_bribe(b(1)));
        assert!(!q.take_bribe(b(42)));
        assert_eq!(q.display().to_string(), before);
    }

    #[test]
    fn bribe_keeps_length() {
        let mut q = ServiceQueue::new();
        q.give_buzzer();
        assert!(q.take_bribe(b(0)));
        assert_eq!(q.len(), 1);

        q.give_buzzer();
        q.give_buzzer();
        assert!(q.take_bribe(b(0)));
        assert!(q.take_bribe(b(2)));
        assert!(q.take_bribe(b(1)));
        assert_eq!(line(&q), vec![1, 2, 0]);
        assert_eq!(q.len(), 3);
        assert_consistent(&q);
    }

    #[test]
    fn released_buzzers_reissue_oldest_first() {
        let mut q = ServiceQueue::new();
        for _ in 0..4 {
            q.give_buzzer();
        }
        q.kick_out(b(2));
        q.seat();
        q.kick_out(b(3));

        assert_eq!(q.give_buzzer(), b(2));
        assert_eq!(q.give_buzzer(), b(0));
        assert_eq!(q.give_buzzer(), b(3));
        assert_eq!(q.give_buzzer(), b(4));
        assert_eq!(line(&q), vec![1, 2, 0, 3, 4]);
        assert_consistent(&q);
    }

    #[test]
    fn directory_capacity_doubles() {
        let mut q = ServiceQueue::new();
        for n in 1..=40usize {
            q.give_buzzer();
            assert_eq!(q.directory_capacity(), n.next_power_of_two().max(2));
        }
    }

    #[test]
    fn reuse_does_not_grow_directory() {
        let mut q = ServiceQueue::new();
        for _ in 0..3 {
            q.give_buzzer();
        }
        let capacity = q.directory_capacity();
        for _ in 0..100 {
            q.seat();
            q.give_buzzer();
        }
        assert_eq!(q.issued(), 3);
        assert_eq!(q.directory_capacity(), capacity);
    }

    #[test]
    fn status_reports_each_state() {
        let mut q = ServiceQueue::new();
        let t = q.give_buzzer();
        assert_eq!(q.status(t), BuzzerStatus::Waiting);
        q.kick_out(t);
        assert_eq!(q.status(t), BuzzerStatus::Idle);
        assert_eq!(q.status(b(1)), BuzzerStatus::Unissued);
        assert_eq!(q.status(b(u32::MAX)), BuzzerStatus::Unissued);
    }

    #[test]
    fn clear_starts_over() {
        let mut q = ServiceQueue::with_capacity(8);
        for _ in 0..5 {
            q.give_buzzer();
        }
        q.seat();
        q.clear();

        assert!(q.is_empty());
        assert_eq!(q.idle(), 0);
        assert_eq!(q.issued(), 0);
        assert_eq!(q.directory_capacity(), 8);
        assert_eq!(q.give_buzzer(), b(0));
        assert_consistent(&q);
    }

    #[test]
    fn display_impl_matches_adaptor() {
        let mut q = ServiceQueue::new();
        q.give_buzzer();
        q.give_buzzer();
        assert_eq!(q.to_string(), "[0 1]");
    }
}
