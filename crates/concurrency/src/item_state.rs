//! Copy-on-write item state
//!
//! `ItemState<V>` is the state record shared by every item variant. It holds
//! identity, status, parent linkage, version metadata, a weak listener
//! registry, and optionally a link to the persistent state it overlays.
//!
//! ## Construction Contracts
//!
//! ```text
//! fresh(...)    status ∈ {EXISTING, NEW}                 no overlay
//! overlay(...)  status ∈ {EXISTING_MODIFIED, EXISTING_REMOVED}
//!               parent / base version / timestamp / id copied from target
//!               observer registered on target
//! ```
//!
//! ## Overlay Wiring
//!
//! ```text
//!   overlay ──Arc──▶ target                 (OverlayLink.target)
//!   overlay ──Arc──▶ OverlayObserver ──Arc──▶ overlay's status cell
//!   target  ─Weak──▶ OverlayObserver        (target's listener registry)
//! ```
//!
//! There is no strong edge from the target back to the overlay, so dropping
//! or disposing the overlay releases everything it pinned.
//!
//! ## Staleness
//!
//! When the target emits `modified` or `destroyed`, the observer flips the
//! overlay's status to `StaleModified` / `StaleDestroyed`. Callers must check
//! [`ItemState::status`] before acting on a transient state; this layer does
//! not reject operations on stale states.

use crate::listener::{ItemRecord, ItemStateListener, ListenerId, Observable, StateEvent};
use crate::registry::ListenerRegistry;
use itemstate_core::{
    ItemId, NodeId, StateError, StateResult, Status, Timestamp, DEFAULT_BASE_VERSION,
};
use parking_lot::{Mutex, ReentrantMutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Variant-specific payload of an item state
pub trait ItemVariant: Send + Sync + 'static {
    /// Whether states of this variant represent nodes
    const IS_NODE: bool;

    /// Copy taken when an overlay is constructed over a state of this variant
    ///
    /// Copies are shallow: shared payloads are shared, not duplicated.
    fn overlay_copy(&self) -> Self;
}

/// Mutable metadata common to all variants
#[derive(Debug, Clone)]
struct Header {
    parent: Option<NodeId>,
    last_modified: Timestamp,
    base_version: String,
}

/// Status shared between a state and its overlay observer
type StatusCell = Arc<Mutex<Status>>;

/// Listener that turns target lifecycle events into staleness
///
/// Owned by the overlay; the target only holds it weakly.
pub struct OverlayObserver {
    item: ItemId,
    status: StatusCell,
    detached: AtomicBool,
}

impl OverlayObserver {
    fn new(item: ItemId, status: StatusCell) -> Self {
        Self {
            item,
            status,
            detached: AtomicBool::new(false),
        }
    }

    /// Stop reacting to events
    ///
    /// Must be called with the status lock held so that an in-flight event
    /// cannot land after disposal.
    fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    /// Whether the owning overlay has been disposed
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    fn mark(&self, stale: Status) {
        let mut status = self.status.lock();
        if self.is_detached() {
            return;
        }
        *status = stale;
        debug!(target: "itemstate::overlay", item = %self.item, status = %stale, "Overlay went stale");
    }
}

impl ItemStateListener for OverlayObserver {
    fn state_modified(&self, _modified: &dyn ItemRecord) {
        self.mark(Status::StaleModified);
    }

    fn state_destroyed(&self, _destroyed: &dyn ItemRecord) {
        self.mark(Status::StaleDestroyed);
    }
}

impl fmt::Debug for OverlayObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayObserver")
            .field("item", &self.item)
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// Clears the running-pass flag, also when a listener panics
struct PassReset<'a>(&'a Cell<bool>);

impl Drop for PassReset<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Link from an overlay to the persistent state it shadows
struct OverlayLink<V: ItemVariant> {
    target: Arc<ItemState<V>>,
    observer: Arc<OverlayObserver>,
    observer_id: ListenerId,
}

/// State of one repository item
///
/// Shared as `Arc<ItemState<V>>`; every operation takes `&self`.
pub struct ItemState<V: ItemVariant> {
    id: ItemId,
    header: RwLock<Header>,
    status: StatusCell,
    /// Held for the length of a discard pass; the flag marks the pass as
    /// running so reentrant calls from a callback on the same thread return.
    discard_pass: ReentrantMutex<Cell<bool>>,
    overlay: Mutex<Option<OverlayLink<V>>>,
    listeners: ListenerRegistry,
    data: RwLock<V>,
}

impl<V: ItemVariant> ItemState<V> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Construct a fresh state with the default base version
    ///
    /// # Errors
    /// Returns `InvalidStatus` unless `status` is `Existing` or `New`.
    pub fn fresh(
        id: ItemId,
        parent: Option<NodeId>,
        status: Status,
        data: V,
    ) -> StateResult<Arc<Self>> {
        Self::fresh_with_base_version(id, parent, status, DEFAULT_BASE_VERSION, data)
    }

    /// Construct a fresh state with an explicit initial base version
    ///
    /// # Errors
    /// Returns `InvalidStatus` unless `status` is `Existing` or `New`.
    pub fn fresh_with_base_version(
        id: ItemId,
        parent: Option<NodeId>,
        status: Status,
        base_version: impl Into<String>,
        data: V,
    ) -> StateResult<Arc<Self>> {
        if !status.is_fresh() {
            error!(target: "itemstate::state", item = %id, %status, "illegal status for fresh construction");
            return Err(StateError::InvalidStatus {
                status,
                operation: "fresh construction",
            });
        }

        Ok(Arc::new(Self {
            id,
            header: RwLock::new(Header {
                parent,
                last_modified: Timestamp::now(),
                base_version: base_version.into(),
            }),
            status: Arc::new(Mutex::new(status)),
            discard_pass: ReentrantMutex::new(Cell::new(false)),
            overlay: Mutex::new(None),
            listeners: ListenerRegistry::new(),
            data: RwLock::new(data),
        }))
    }

    /// Construct a copy-on-write overlay of `target`
    ///
    /// Parent, base version, timestamp, identifier and a shallow copy of the
    /// payload are taken from `target`; the new state then watches `target`
    /// for modification and destruction.
    ///
    /// # Errors
    /// - `InvalidStatus` unless `status` is `ExistingModified` or `ExistingRemoved`
    /// - `NestedOverlay` if `target` is itself an overlay
    pub fn overlay(target: &Arc<Self>, status: Status) -> StateResult<Arc<Self>> {
        if !status.is_copy_on_write() {
            error!(target: "itemstate::state", item = %target.id, %status, "illegal status for overlay construction");
            return Err(StateError::InvalidStatus {
                status,
                operation: "overlay construction",
            });
        }
        if target.has_overlayed_state() {
            error!(target: "itemstate::state", item = %target.id, "overlay target is itself an overlay");
            return Err(StateError::NestedOverlay(target.id.clone()));
        }

        let header = target.header.read().clone();
        let data = target.data.read().overlay_copy();
        let status_cell: StatusCell = Arc::new(Mutex::new(status));
        let observer = Arc::new(OverlayObserver::new(
            target.id.clone(),
            Arc::clone(&status_cell),
        ));
        let observer_id = target.listeners.add(&(observer.clone() as Arc<dyn ItemStateListener>));

        debug!(target: "itemstate::overlay", item = %target.id, %status, "Overlay created");

        Ok(Arc::new(Self {
            id: target.id.clone(),
            header: RwLock::new(header),
            status: status_cell,
            discard_pass: ReentrantMutex::new(Cell::new(false)),
            overlay: Mutex::new(Some(OverlayLink {
                target: Arc::clone(target),
                observer,
                observer_id,
            })),
            listeners: ListenerRegistry::new(),
            data: RwLock::new(data),
        }))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Item identity
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Whether this state represents a node
    pub fn is_node(&self) -> bool {
        V::IS_NODE
    }

    /// Current status
    pub fn status(&self) -> Status {
        *self.status.lock()
    }

    /// True for any status other than `Existing`
    pub fn is_transient(&self) -> bool {
        self.status().is_transient()
    }

    /// Owning parent node, `None` for a root or free-floating item
    pub fn parent_id(&self) -> Option<NodeId> {
        self.header.read().parent
    }

    /// Re-link to another parent, or detach with `None`
    pub fn set_parent_id(&self, parent: Option<NodeId>) {
        self.header.write().parent = parent;
    }

    /// Last modification time
    pub fn last_modified(&self) -> Timestamp {
        self.header.read().last_modified
    }

    /// Version this state is based on
    pub fn base_version(&self) -> String {
        self.header.read().base_version.clone()
    }

    /// Whether this state overlays a persistent state
    pub fn has_overlayed_state(&self) -> bool {
        self.overlay.lock().is_some()
    }

    /// The persistent state this state overlays, if any
    pub fn overlayed_state(&self) -> Option<Arc<Self>> {
        self.overlay
            .lock()
            .as_ref()
            .map(|link| Arc::clone(&link.target))
    }

    /// Number of live listeners registered on this state
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a live listener is registered under `id`
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    pub(crate) fn data(&self) -> RwLockReadGuard<'_, V> {
        self.data.read()
    }

    pub(crate) fn data_mut(&self) -> RwLockWriteGuard<'_, V> {
        self.data.write()
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Set the status
    ///
    /// Every member of the closed set is accepted, in any order.
    pub fn set_status(&self, status: Status) {
        *self.status.lock() = status;
    }

    /// Set the status from its raw code
    ///
    /// # Errors
    /// Returns `UnknownStatusCode` for codes outside the closed set.
    pub fn set_status_code(&self, code: i32) -> StateResult<()> {
        let status = Status::from_code(code).map_err(|e| {
            error!(target: "itemstate::state", item = %self.id, code, "illegal status code");
            e
        })?;
        self.set_status(status);
        Ok(())
    }

    /// Render this state invalid
    ///
    /// Unless the status is already `Undefined`, every listener registered at
    /// the start of the pass receives exactly one `discarded` callback, after
    /// which the status becomes `Undefined`.
    ///
    /// A call from another thread while a pass is running blocks until that
    /// pass has finished and then returns with the status `Undefined`. A
    /// reentrant call from a callback of the running pass returns at once.
    pub fn discard(&self) {
        let pass = self.discard_pass.lock();
        if pass.get() {
            return;
        }
        if self.status() == Status::Undefined {
            return;
        }
        pass.set(true);
        let _reset = PassReset(&pass);
        self.notify(StateEvent::Discarded);
        self.set_status(Status::Undefined);
        debug!(target: "itemstate::state", item = %self.id, "State discarded");
    }

    /// Release this state; called once by the owning manager
    ///
    /// Clears the listener registry, detaches from the overlaid state and
    /// resets the status to `Undefined`. Calling it again has no effect.
    pub fn dispose(&self) {
        self.listeners.clear();
        let link = self.overlay.lock().take();
        {
            let mut status = self.status.lock();
            if let Some(link) = &link {
                link.observer.detach();
            }
            *status = Status::Undefined;
        }
        if let Some(link) = link {
            link.target.listeners.remove(link.observer_id);
            debug!(target: "itemstate::overlay", item = %self.id, "Overlay disposed");
        }
    }

    // =========================================================================
    // Lifecycle emission
    // =========================================================================

    /// Tell listeners the persistent state was created
    pub fn notify_created(&self) {
        self.notify(StateEvent::Created);
    }

    /// Tell listeners the persistent state was modified
    pub fn notify_modified(&self) {
        self.notify(StateEvent::Modified);
    }

    /// Tell listeners the persistent state was destroyed
    pub fn notify_destroyed(&self) {
        self.notify(StateEvent::Destroyed);
    }
}

impl<V: ItemVariant> Observable for ItemState<V> {
    fn add_listener(&self, listener: Arc<dyn ItemStateListener>) -> ListenerId {
        self.listeners.add(&listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn notify(&self, event: StateEvent) {
        let snapshot = self.listeners.snapshot();
        trace!(target: "itemstate::notify", item = %self.id, %event, listeners = snapshot.len(), "Notification pass");
        for listener in &snapshot {
            event.dispatch(listener.as_ref(), self);
        }
    }
}

impl<V: ItemVariant> ItemRecord for ItemState<V> {
    fn id(&self) -> &ItemId {
        ItemState::id(self)
    }

    fn status(&self) -> Status {
        ItemState::status(self)
    }

    fn parent_id(&self) -> Option<NodeId> {
        ItemState::parent_id(self)
    }

    fn is_node(&self) -> bool {
        V::IS_NODE
    }

    fn has_overlayed_state(&self) -> bool {
        ItemState::has_overlayed_state(self)
    }

    fn last_modified(&self) -> Timestamp {
        ItemState::last_modified(self)
    }

    fn base_version(&self) -> String {
        ItemState::base_version(self)
    }
}

impl<V: ItemVariant> fmt::Debug for ItemState<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemState")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("overlay", &self.has_overlayed_state())
            .field("listeners", &self.listeners)
            .finish()
    }
}
