//! Events and listeners.

use crate::node::NodeId;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Event listener callback.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&Event) + 'static,
{
    Rc::new(callback)
}

/// Identifies a registered listener so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// An event travelling from its target up through the target's ancestors.
pub struct Event {
    event_type: String,
    target: NodeId,
    current_target: Cell<NodeId>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub(crate) fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            current_target: Cell::new(target),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The node the event was dispatched to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listeners are currently running.
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }

    /// Stop the event from reaching further ancestors. Remaining listeners on
    /// the current node still run.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("target", &self.target)
            .field("current_target", &self.current_target.get())
            .field("propagation_stopped", &self.propagation_stopped.get())
            .finish()
    }
}

pub(crate) struct RegisteredListener {
    pub(crate) event_type: String,
    pub(crate) id: ListenerId,
    pub(crate) callback: Listener,
}
