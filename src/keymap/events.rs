use super::binding::BindingKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BindingChanged,
    CustomsChanged,
    SpicesChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// One binding's entries changed, from a commit or from its backing store.
    BindingChanged(BindingKey),
    /// The custom shortcut list was rebuilt.
    CustomsChanged,
    /// The spice categories were rebuilt.
    SpicesChanged,
}

impl TableEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BindingChanged(_) => EventKind::BindingChanged,
            Self::CustomsChanged => EventKind::CustomsChanged,
            Self::SpicesChanged => EventKind::SpicesChanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Callback = Box<dyn FnMut(&TableEvent)>;

#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, EventKind, Callback)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, kind, callback));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Calls every subscriber of the event's kind, in subscription order.
    pub fn emit(&mut self, event: &TableEvent) {
        let kind = event.kind();
        for (_, entry_kind, callback) in &mut self.entries {
            if *entry_kind == kind {
                callback(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn events_reach_only_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::new();
        let sink = Rc::clone(&seen);
        subscribers.subscribe(
            EventKind::CustomsChanged,
            Box::new(move |event| sink.borrow_mut().push(event.clone())),
        );

        subscribers.emit(&TableEvent::SpicesChanged);
        subscribers.emit(&TableEvent::CustomsChanged);

        assert_eq!(*seen.borrow(), vec![TableEvent::CustomsChanged]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers = Subscribers::new();
        let counter = Rc::clone(&count);
        let id = subscribers.subscribe(
            EventKind::BindingChanged,
            Box::new(move |_| *counter.borrow_mut() += 1),
        );

        subscribers.emit(&TableEvent::BindingChanged(BindingKey(3)));
        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.emit(&TableEvent::BindingChanged(BindingKey(3)));

        assert_eq!(*count.borrow(), 1);
        assert!(subscribers.is_empty());
    }
}
