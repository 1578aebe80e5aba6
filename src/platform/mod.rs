//! Platform abstraction layer
//!
//! What a session needs from its host:
//! - Exclusive pointer/keyboard capture
//! - Cancellable one-shot timers
//! - Lifecycle callbacks (`on_complete`, `on_exit`)
//! - Event listeners, owned by the session as a subscription table

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::sim::{Discovery, Outcome};

/// Handle to a scheduled one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// Capabilities and callbacks the host provides to a session
pub trait SessionHost {
    /// Ask for look-capture; the answer arrives later via `GameSession::capture_acquired`
    fn request_capture(&mut self);
    fn release_capture(&mut self);

    /// Schedule a one-shot timer. The host delivers it through `GameSession::fire_timer`.
    fn schedule_timer(&mut self, delay_ms: u32) -> Option<TimerId>;
    fn cancel_timer(&mut self, id: TimerId);

    /// Invoked at most once per session, after the grace delay
    fn on_complete(&mut self);
    /// The player walked away (intro screen or explicit quit)
    fn on_exit(&mut self);

    /// Transient acknowledgment of a find (flash, sound)
    fn on_discovery(&mut self, _discovery: &Discovery) {}
    /// The session just reached `Complete`
    fn on_finished(&mut self, _outcome: Outcome) {}
}

/// Something that must be undone when the session ends
pub trait Subscription {
    fn detach(&mut self);
}

/// Listeners owned by a session, torn down together
#[derive(Default)]
pub struct Subscriptions {
    entries: Vec<Box<dyn Subscription>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, subscription: Box<dyn Subscription>) {
        self.entries.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Detach in reverse order of attachment
    pub fn detach_all(&mut self) {
        while let Some(mut entry) = self.entries.pop() {
            entry.detach();
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.detach_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Subscription for Probe {
        fn detach(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    #[test]
    fn test_detach_all_in_reverse() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscriptions::new();
        for name in ["keydown", "keyup", "mousemove"] {
            subs.attach(Box::new(Probe {
                name,
                log: log.clone(),
            }));
        }
        assert_eq!(subs.len(), 3);
        subs.detach_all();
        assert!(subs.is_empty());
        assert_eq!(*log.borrow(), vec!["mousemove", "keyup", "keydown"]);

        // Second pass has nothing left to do
        subs.detach_all();
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_drop_detaches() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut subs = Subscriptions::new();
            subs.attach(Box::new(Probe {
                name: "resize",
                log: log.clone(),
            }));
        }
        assert_eq!(*log.borrow(), vec!["resize"]);
    }
}
