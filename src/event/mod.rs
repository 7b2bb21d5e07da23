mod bus;
mod events;
mod handlers;

pub use bus::{EventBus, Subscription};
pub use events::{Change, ChangeKind, EditEvent, EditTarget};
pub use handlers::EventLog;

pub trait EventHandler {
    fn handle_event(&mut self, event: &EditEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&EditEvent),
{
    fn handle_event(&mut self, event: &EditEvent) {
        self(event)
    }
}
