//! In-memory reference host.
//!
//! [`EventBus`] keeps one priority-ordered [`Table`] per event kind and
//! implements [`DispatchTableResolver`], so registrars can install into it
//! exactly as they would into a real host. [`EventBus::call`] delivers an
//! event to its table the way a host's dispatch loop does.

use hark_core::{
    DispatchFailure, DispatchTableResolver, Event, EventKind, EventType, HandlerList,
    HostAccessError, Registration, SubscriberId,
};
use parking_lot::RwLock;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};
use tracing::{debug, error, trace};

/// A priority-ordered list of registrations for one kind.
///
/// Registrations with equal priority keep their registration order. The list
/// is copy-on-write: dispatch works on a snapshot, so executors may install
/// or revoke registrations while an event is in flight.
pub struct Table {
    name: &'static str,
    entries: RwLock<Arc<[Registration]>>,
}

impl Table {
    /// Creates an empty table labelled with a kind name.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// The kind name this table was created for.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The current registrations in invocation order.
    pub fn snapshot(&self) -> Arc<[Registration]> {
        self.entries.read().clone()
    }

    /// Delivers `event` to every registration in priority order.
    pub fn fire(&self, event: &mut dyn Event) -> DispatchReport {
        let baked = self.snapshot();
        let mut report = DispatchReport::default();

        for registration in baked.iter() {
            if !registration.accepts(event) {
                trace!(
                    table = self.name,
                    subscriber = %registration.subscriber(),
                    "skipping cancelled event"
                );
                report.skipped += 1;
                continue;
            }

            report.invoked += 1;
            if let Err(failure) = registration.executor().execute(event) {
                error!(
                    table = self.name,
                    subscriber = %registration.subscriber(),
                    priority = %registration.priority(),
                    error = %failure,
                    "could not pass event to registration"
                );
                report.failures.push(failure);
            }
        }

        report
    }
}

impl HandlerList for Table {
    fn register(&self, registration: Registration) {
        let mut entries = self.entries.write();
        let mut next = entries.to_vec();
        let at = next.partition_point(|r| r.priority() <= registration.priority());
        next.insert(at, registration);
        *entries = Arc::from(next);
    }

    fn unregister(&self, subscriber: &SubscriberId) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        let kept: Vec<Registration> = entries
            .iter()
            .filter(|r| r.subscriber() != subscriber)
            .cloned()
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            *entries = Arc::from(kept);
        }
        removed
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// What happened while delivering one event.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Registrations whose executor ran.
    pub invoked: usize,
    /// Registrations skipped because the event was already cancelled.
    pub skipped: usize,
    /// Failures reported by executors, in invocation order.
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    /// Whether no executor failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An in-memory host event bus.
///
/// # Example
///
/// ```rust,ignore
/// let bus = Arc::new(EventBus::new());
/// let registrar = Registrar::new("demo", bus.clone());
///
/// registrar.handle_event::<Join>().handle(|join| println!("{} joined", join.player.name))?;
///
/// let report = bus.call(&mut Join::new(player));
/// assert_eq!(report.invoked, 1);
/// ```
pub struct EventBus {
    tables: RwLock<HashMap<TypeId, Arc<Table>>>,
    strict: bool,
}

impl EventBus {
    /// Creates a bus that creates tables on demand.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a bus.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::default()
    }

    /// Delivers `event` to the table for its runtime kind.
    ///
    /// An event with no table reaches nobody and yields an empty report.
    pub fn call(&self, event: &mut dyn Event) -> DispatchReport {
        let id = {
            let any: &dyn Any = &*event;
            any.type_id()
        };
        let table = self.tables.read().get(&id).cloned();

        match table {
            Some(table) => table.fire(event),
            None => {
                trace!(event = event.event_name(), "no dispatch table");
                DispatchReport::default()
            }
        }
    }

    /// Number of registrations that would see an event of `kind`.
    pub fn registration_count(&self, kind: &EventKind) -> usize {
        self.tables
            .read()
            .get(&kind.id())
            .map_or(0, |table| table.len())
    }

    /// Number of registrations across all tables.
    pub fn total_registrations(&self) -> usize {
        self.unique_tables().iter().map(|table| table.len()).sum()
    }

    /// Whether tables are only available for declared kinds.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    // Shared tables appear under several keys.
    fn unique_tables(&self) -> Vec<Arc<Table>> {
        let mut unique: Vec<Arc<Table>> = Vec::new();
        for table in self.tables.read().values() {
            if !unique.iter().any(|seen| Arc::ptr_eq(seen, table)) {
                unique.push(table.clone());
            }
        }
        unique
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTableResolver for EventBus {
    fn resolve(&self, kind: &EventKind) -> Result<Arc<dyn HandlerList>, HostAccessError> {
        if let Some(table) = self.tables.read().get(&kind.id()) {
            let table: Arc<dyn HandlerList> = table.clone();
            return Ok(table);
        }

        if self.strict {
            return Err(HostAccessError::UnknownKind { kind: kind.name() });
        }

        let table = self
            .tables
            .write()
            .entry(kind.id())
            .or_insert_with(|| {
                debug!(kind = %kind, "created dispatch table");
                Arc::new(Table::new(kind.name()))
            })
            .clone();
        let table: Arc<dyn HandlerList> = table;
        Ok(table)
    }

    fn unregister_all(&self, subscriber: &SubscriberId) -> usize {
        self.unique_tables()
            .iter()
            .map(|table| table.unregister(subscriber))
            .sum()
    }
}

/// Builder for [`EventBus`].
#[derive(Debug, Default)]
pub struct EventBusBuilder {
    strict: bool,
    declared: Vec<EventKind>,
    shared: Vec<(EventKind, EventKind)>,
}

impl EventBusBuilder {
    /// In strict mode only declared (or shared) kinds resolve; anything else
    /// fails with [`HostAccessError::UnknownKind`].
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Creates a table for `U` up front.
    pub fn declare<U: EventType>(mut self) -> Self {
        self.declared.push(U::kind());
        self
    }

    /// Makes kind `B` use the table of kind `A`, the way a host with coarser
    /// tables would deliver both kinds through one list.
    pub fn share<A: EventType, B: EventType>(mut self) -> Self {
        self.shared.push((A::kind(), B::kind()));
        self
    }

    /// Builds the bus.
    pub fn build(self) -> EventBus {
        let mut tables: HashMap<TypeId, Arc<Table>> = HashMap::new();

        for kind in &self.declared {
            tables
                .entry(kind.id())
                .or_insert_with(|| Arc::new(Table::new(kind.name())));
        }

        for (owner, alias) in &self.shared {
            let table = tables
                .entry(owner.id())
                .or_insert_with(|| Arc::new(Table::new(owner.name())))
                .clone();
            tables.insert(alias.id(), table);
        }

        EventBus {
            tables: RwLock::new(tables),
            strict: self.strict,
        }
    }
}
