use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{EditEvent, EventHandler};

/// Keeps a shared, bounded history of edit events.
///
/// Clones share the same history, so one clone can be subscribed to the bus
/// while another is kept by the observer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EditEvent>>>,
    capacity: Option<usize>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the most recent `capacity` events
    pub fn bounded(capacity: usize) -> Self {
        Self {
            events: Rc::default(),
            capacity: Some(capacity),
        }
    }

    pub fn events(&self) -> Vec<EditEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &EditEvent) {
        let mut events = self.events.borrow_mut();
        events.push(event.clone());
        if let Some(capacity) = self.capacity {
            let overflow = events.len().saturating_sub(capacity);
            events.drain(..overflow);
        }
    }
}
