// src/core/ticket.rs

use std::collections::HashMap;

/// Identifies one in-flight request made on behalf of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    /// The task the request is about.
    pub target: String,
    pub seq: u64,
}

/// The views that fetch data for a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Result,
    Report,
    Stop,
}

/// Hands out request tickets and decides whether a late response still applies.
///
/// Each slot holds at most one current ticket. Issuing a new ticket or
/// cancelling the slot makes any earlier response for that slot stale.
#[derive(Debug, Default)]
pub struct TicketDesk {
    next_seq: u64,
    current: HashMap<Slot, RequestTicket>,
}

impl TicketDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, slot: Slot, target: &str) -> RequestTicket {
        self.next_seq += 1;
        let ticket = RequestTicket { target: target.to_string(), seq: self.next_seq };
        self.current.insert(slot, ticket.clone());
        ticket
    }

    /// Sequence number for requests that are not tied to a single task (refreshes).
    pub fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    pub fn is_current(&self, slot: Slot, ticket: &RequestTicket) -> bool {
        self.current.get(&slot) == Some(ticket)
    }

    /// Consumes the ticket if it is still current. Returns whether the response should be applied.
    pub fn redeem(&mut self, slot: Slot, ticket: &RequestTicket) -> bool {
        if self.is_current(slot, ticket) {
            self.current.remove(&slot);
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self, slot: Slot) {
        self.current.remove(&slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let mut desk = TicketDesk::new();
        let first = desk.issue(Slot::Result, "1");
        let second = desk.issue(Slot::Result, "2");
        assert!(!desk.redeem(Slot::Result, &first));
        assert!(desk.redeem(Slot::Result, &second));
        assert!(!desk.redeem(Slot::Result, &second));
    }

    #[test]
    fn cancel_makes_response_stale() {
        let mut desk = TicketDesk::new();
        let ticket = desk.issue(Slot::Report, "2");
        desk.cancel(Slot::Report);
        assert!(!desk.redeem(Slot::Report, &ticket));
    }

    #[test]
    fn slots_are_independent() {
        let mut desk = TicketDesk::new();
        let result = desk.issue(Slot::Result, "1");
        let report = desk.issue(Slot::Report, "1");
        assert!(desk.redeem(Slot::Report, &report));
        assert!(desk.is_current(Slot::Result, &result));
    }

    #[test]
    fn same_target_new_request_is_still_distinct() {
        let mut desk = TicketDesk::new();
        let first = desk.issue(Slot::Result, "1");
        let second = desk.issue(Slot::Result, "1");
        assert_ne!(first, second);
        assert!(!desk.is_current(Slot::Result, &first));
    }
}
