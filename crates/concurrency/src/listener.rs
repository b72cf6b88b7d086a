//! Observer and observable capabilities for item states
//!
//! Two separate traits carry the two roles:
//!
//! - [`ItemStateListener`]: the observer side, four lifecycle callbacks
//! - [`Observable`]: the observed side, register / unregister / notify
//!
//! An item state is always observable. When it overlays a persistent state it
//! does not observe that state itself; it owns a dedicated observer object
//! that is registered on the target (see `item_state::OverlayObserver`).

use itemstate_core::{ItemId, NodeId, Status, Timestamp};
use std::fmt;
use std::sync::Arc;

/// Lifecycle event delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEvent {
    /// The persistent state was created
    Created,
    /// The persistent state was modified
    Modified,
    /// The persistent state was destroyed
    Destroyed,
    /// The state was discarded (rendered invalid)
    Discarded,
}

impl StateEvent {
    /// Invoke the matching callback on `listener`
    pub fn dispatch(self, listener: &dyn ItemStateListener, state: &dyn ItemRecord) {
        match self {
            StateEvent::Created => listener.state_created(state),
            StateEvent::Modified => listener.state_modified(state),
            StateEvent::Destroyed => listener.state_destroyed(state),
            StateEvent::Discarded => listener.state_discarded(state),
        }
    }
}

impl fmt::Display for StateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateEvent::Created => "created",
            StateEvent::Modified => "modified",
            StateEvent::Destroyed => "destroyed",
            StateEvent::Discarded => "discarded",
        };
        f.write_str(name)
    }
}

/// Identity of a registered listener
///
/// Derived from the address of the listener allocation, so the same listener
/// always maps to the same id no matter how the handle is typed.
///
/// An id is only meaningful while its listener is alive. Once the listener is
/// dropped its address may be reused by a later allocation, and a stale id
/// then names whichever listener registers at that address. Unregister
/// before dropping, or let the weak registration lapse on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(usize);

impl ListenerId {
    /// Identity of a shared listener
    pub fn of<L: ?Sized>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }

    /// Identity of a listener seen through a plain reference
    ///
    /// Matches [`ListenerId::of`] for the `Arc` the reference points into, so
    /// a listener can unregister itself from inside a callback.
    pub fn of_ref<L: ?Sized>(listener: &L) -> Self {
        Self(listener as *const L as *const () as usize)
    }
}

/// Observer of item-state lifecycle events
///
/// All callbacks default to no-ops. Callbacks run with no registry or state
/// lock held and may freely register or unregister listeners.
pub trait ItemStateListener: Send + Sync {
    /// The observed state has been created
    fn state_created(&self, _created: &dyn ItemRecord) {}

    /// The observed state has been modified
    fn state_modified(&self, _modified: &dyn ItemRecord) {}

    /// The observed state has been destroyed
    fn state_destroyed(&self, _destroyed: &dyn ItemRecord) {}

    /// The observed state has been discarded
    fn state_discarded(&self, _discarded: &dyn ItemRecord) {}
}

/// Registration and notification surface of an observed state
pub trait Observable {
    /// Register a listener; idempotent per listener identity
    ///
    /// Only a weak handle is retained: registration never keeps the
    /// listener alive.
    fn add_listener(&self, listener: Arc<dyn ItemStateListener>) -> ListenerId;

    /// Unregister a listener; returns false if it was not registered
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Deliver `event` once to every listener registered when the pass starts
    fn notify(&self, event: StateEvent);
}

/// Read view of an item state, as handed to listeners
pub trait ItemRecord: Observable + Send + Sync {
    /// Item identity
    fn id(&self) -> &ItemId;

    /// Current status
    fn status(&self) -> Status;

    /// Owning parent node, `None` for a root or free-floating item
    fn parent_id(&self) -> Option<NodeId>;

    /// Whether the item is a node
    fn is_node(&self) -> bool;

    /// Whether this state overlays a persistent state
    fn has_overlayed_state(&self) -> bool;

    /// Last modification time
    fn last_modified(&self) -> Timestamp;

    /// Version this state is based on
    fn base_version(&self) -> String;

    /// True for any status other than `Existing`
    fn is_transient(&self) -> bool {
        self.status().is_transient()
    }
}
