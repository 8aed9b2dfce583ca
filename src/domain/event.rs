//! Event payload and the per-node listener registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{instrument, trace};

use crate::domain::error::ListenerError;
use crate::domain::node::NodeRef;

/// Outcome of a single listener call.
pub type ListenerResult = Result<(), ListenerError>;

/// Listener callback. Shared so invocation can run on a snapshot of the registry.
pub type Callback = Rc<dyn Fn(&Event) -> ListenerResult>;

/// Payload handed to every listener.
///
/// `source` is the node currently executing `emit`, not the node the caller
/// started on: it changes as propagation descends.
#[derive(Clone)]
pub struct Event {
    pub name: String,
    pub source: NodeRef,
}

impl Event {
    pub fn new(name: impl Into<String>, source: NodeRef) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// True when the event is being delivered on `node` itself.
    pub fn is_from(&self, node: &NodeRef) -> bool {
        Rc::ptr_eq(&self.source, node)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("source", &self.source.label())
            .finish()
    }
}

/// Event name to ordered callbacks. Append-only.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: RefCell<HashMap<String, Vec<Callback>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to the sequence for `event_name`. Never fails and
    /// never deduplicates.
    pub fn register<F>(&self, event_name: impl Into<String>, callback: F)
    where
        F: Fn(&Event) -> ListenerResult + 'static,
    {
        let event_name = event_name.into();
        trace!("register listener for '{}'", event_name);
        self.entries
            .borrow_mut()
            .entry(event_name)
            .or_default()
            .push(Rc::new(callback));
    }

    /// Call every listener for `event.name` in registration order.
    ///
    /// The first failing listener aborts the rest and its error is returned.
    /// Runs on a snapshot, so listeners may register further listeners here;
    /// those fire from the next invocation on.
    #[instrument(level = "trace", skip(self))]
    pub fn invoke(&self, event: &Event) -> ListenerResult {
        let callbacks: Vec<Callback> = match self.entries.borrow().get(&event.name) {
            Some(callbacks) => callbacks.clone(),
            None => return Ok(()),
        };
        for callback in callbacks {
            callback(event)?;
        }
        Ok(())
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.entries
            .borrow()
            .get(event_name)
            .map_or(0, |callbacks| callbacks.len())
    }

    pub fn total_listener_count(&self) -> usize {
        self.entries.borrow().values().map(|v| v.len()).sum()
    }

    /// Registered event names, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut map = f.debug_map();
        for name in self.event_names() {
            map.entry(&name, &entries.get(&name).map_or(0, |v| v.len()));
        }
        map.finish()
    }
}
