use std::collections::{BTreeMap, BTreeSet};

/// Independent lane of asynchronous work. A newer issue on a slot makes any
/// older ticket for that slot stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    ProductRender,
    PoseDescription,
    Inspire,
    Generation,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Self::ProductRender => "product render",
            Self::PoseDescription => "pose description",
            Self::Inspire => "inspire",
            Self::Generation => "generation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub slot: Slot,
    pub token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct RequestTokens {
    counter: u64,
    latest: BTreeMap<Slot, u64>,
    in_flight: BTreeSet<Slot>,
}

impl RequestTokens {
    pub fn issue(&mut self, slot: Slot) -> Ticket {
        let token = self.bump();
        self.latest.insert(slot, token);
        self.in_flight.insert(slot);
        Ticket { slot, token }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.token)
    }

    /// Marks the slot idle when `ticket` is its latest; stale tickets change nothing.
    pub fn settle(&mut self, ticket: Ticket) -> Settled {
        if !self.is_current(ticket) {
            return Settled::Stale;
        }
        self.in_flight.remove(&ticket.slot);
        Settled::Applied
    }

    /// Orphans every outstanding ticket for `slot`.
    pub fn invalidate(&mut self, slot: Slot) {
        let token = self.bump();
        self.latest.insert(slot, token);
        self.in_flight.remove(&slot);
    }

    pub fn in_flight(&self, slot: Slot) -> bool {
        self.in_flight.contains(&slot)
    }

    pub fn busy_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.in_flight.iter().copied()
    }

    fn bump(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestTokens, Settled, Slot};

    #[test]
    fn newer_ticket_makes_older_one_stale() {
        let mut tokens = RequestTokens::default();
        let first = tokens.issue(Slot::ProductRender);
        let second = tokens.issue(Slot::ProductRender);
        assert!(second.token > first.token);

        assert_eq!(tokens.settle(first), Settled::Stale);
        assert!(tokens.in_flight(Slot::ProductRender));
        assert_eq!(tokens.settle(second), Settled::Applied);
        assert!(!tokens.in_flight(Slot::ProductRender));
    }

    #[test]
    fn slots_are_independent() {
        let mut tokens = RequestTokens::default();
        let render = tokens.issue(Slot::ProductRender);
        let inspire = tokens.issue(Slot::Inspire);
        assert_eq!(tokens.settle(render), Settled::Applied);
        assert!(tokens.in_flight(Slot::Inspire));
        assert_eq!(tokens.settle(inspire), Settled::Applied);
        assert_eq!(tokens.busy_slots().count(), 0);
    }

    #[test]
    fn invalidate_orphans_outstanding_ticket() {
        let mut tokens = RequestTokens::default();
        let ticket = tokens.issue(Slot::Generation);
        tokens.invalidate(Slot::Generation);
        assert!(!tokens.in_flight(Slot::Generation));
        assert_eq!(tokens.settle(ticket), Settled::Stale);
    }
}
