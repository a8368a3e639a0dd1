//! In-memory connection provider.
//!
//! Rows live in a shared `BTreeMap`. Each connection keeps an undo log, so a
//! connection dropped without [`StoreConnection::release`] rolls its writes
//! back the same way an open PostgreSQL transaction would. Failures can be
//! injected per operation, and every acquire, release and store call is
//! counted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::models::{NewToDoRecord, ToDoRecord};
use crate::store::{ConnectionProvider, ExecOutcome, StoreConnection, StoreError};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, ToDoRecord>,
    last_id: i64,
}

#[derive(Debug, Clone, Default)]
struct Failures {
    acquire: Option<String>,
    insert: Option<String>,
    omit_insert_id: bool,
    query: Option<String>,
    update: Option<String>,
    delete: Option<String>,
    release: Option<String>,
    duplicate_rows: bool,
    latency: Option<Duration>,
}

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    committed: AtomicUsize,
    rolled_back: AtomicUsize,
    store_calls: AtomicUsize,
}

#[derive(Debug, Default)]
struct Shared {
    table: Mutex<Table>,
    failures: Mutex<Failures>,
    counters: Counters,
}

/// Snapshot of the provider's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub acquired: usize,
    /// Connections committed through `release`
    pub committed: usize,
    /// Connections dropped without `release`
    pub rolled_back: usize,
    pub store_calls: usize,
}

impl MemoryStats {
    pub fn released(&self) -> usize {
        self.committed + self.rolled_back
    }
}

/// Clones share the same table, failure plan and counters.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    shared: Arc<Shared>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> MemoryStats {
        let counters = &self.shared.counters;
        MemoryStats {
            acquired: counters.acquired.load(Ordering::SeqCst),
            committed: counters.committed.load(Ordering::SeqCst),
            rolled_back: counters.rolled_back.load(Ordering::SeqCst),
            store_calls: counters.store_calls.load(Ordering::SeqCst),
        }
    }

    /// Current rows ordered by id.
    pub fn rows(&self) -> Vec<ToDoRecord> {
        lock(&self.shared.table).rows.values().cloned().collect()
    }

    /// Put a row in place directly, bypassing connections and counters.
    pub fn seed(&self, record: ToDoRecord) {
        let mut table = lock(&self.shared.table);
        table.last_id = table.last_id.max(record.id);
        table.rows.insert(record.id, record);
    }

    pub fn fail_acquire(&self, message: impl Into<String>) -> &Self {
        self.plan(|f| f.acquire = Some(message.into()))
    }

    pub fn fail_insert(&self, message: impl Into<String>) -> &Self {
        self.plan(|f| f.insert = Some(message.into()))
    }

    /// Inserts succeed but report no generated id.
    pub fn omit_insert_id(&self) -> &Self {
        self.plan(|f| f.omit_insert_id = true)
    }

    /// Fail `find_by_id` and `find_all`.
    pub fn fail_queries(&self, message: impl Into<String>) -> &Self {
        self.plan(|f| f.query = Some(message.into()))
    }

    pub fn fail_update(&self, message: impl Into<String>) -> &Self {
        self.plan(|f| f.update = Some(message.into()))
    }

    pub fn fail_delete(&self, message: impl Into<String>) -> &Self {
        self.plan(|f| f.delete = Some(message.into()))
    }

    pub fn fail_release(&self, message: impl Into<String>) -> &Self {
        self.plan(|f| f.release = Some(message.into()))
    }

    /// `find_by_id` returns every match twice.
    pub fn duplicate_rows(&self) -> &Self {
        self.plan(|f| f.duplicate_rows = true)
    }

    /// Delay every acquire and store call.
    pub fn with_latency(&self, latency: Duration) -> &Self {
        self.plan(|f| f.latency = Some(latency))
    }

    /// Drop every injected failure and delay.
    pub fn heal(&self) -> &Self {
        self.plan(|f| *f = Failures::default())
    }

    fn plan(&self, apply: impl FnOnce(&mut Failures)) -> &Self {
        apply(&mut lock(&self.shared.failures));
        self
    }

    fn failures(&self) -> Failures {
        lock(&self.shared.failures).clone()
    }
}

#[async_trait]
impl ConnectionProvider for InMemoryProvider {
    type Connection = InMemoryConnection;

    async fn acquire(&self) -> Result<InMemoryConnection, StoreError> {
        let failures = self.failures();
        if let Some(latency) = failures.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = failures.acquire {
            return Err(StoreError::Connection(message));
        }

        self.shared.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(InMemoryConnection {
            provider: self.clone(),
            undo: Mutex::new(Vec::new()),
            released: false,
        })
    }
}

#[derive(Debug)]
enum Undo {
    Inserted(i64),
    Replaced(ToDoRecord),
}

#[derive(Debug)]
pub struct InMemoryConnection {
    provider: InMemoryProvider,
    undo: Mutex<Vec<Undo>>,
    released: bool,
}

impl InMemoryConnection {
    /// Count the call, wait out any latency and hand back the failure plan.
    async fn enter(&self) -> Result<Failures, StoreError> {
        if self.released {
            return Err(StoreError::Connection("connection already released".into()));
        }
        self.provider
            .shared
            .counters
            .store_calls
            .fetch_add(1, Ordering::SeqCst);

        let failures = self.provider.failures();
        if let Some(latency) = failures.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(failures)
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        lock(&self.provider.shared.table)
    }

    fn record(&self, undo: Undo) {
        lock(&self.undo).push(undo);
    }
}

#[async_trait]
impl StoreConnection for InMemoryConnection {
    async fn insert(&self, record: NewToDoRecord) -> Result<ExecOutcome, StoreError> {
        let failures = self.enter().await?;
        if let Some(message) = failures.insert {
            return Err(StoreError::Query(message));
        }

        let id = {
            let mut table = self.table();
            table.last_id += 1;
            let id = table.last_id;
            table.rows.insert(id, record.with_id(id));
            id
        };
        self.record(Undo::Inserted(id));

        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: (!failures.omit_insert_id).then_some(id),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Vec<ToDoRecord>, StoreError> {
        let failures = self.enter().await?;
        if let Some(message) = failures.query {
            return Err(StoreError::Query(message));
        }

        let found: Vec<ToDoRecord> = self.table().rows.get(&id).cloned().into_iter().collect();
        if failures.duplicate_rows {
            return Ok(found.iter().chain(found.iter()).cloned().collect());
        }
        Ok(found)
    }

    async fn update(&self, record: ToDoRecord) -> Result<ExecOutcome, StoreError> {
        let failures = self.enter().await?;
        if let Some(message) = failures.update {
            return Err(StoreError::Query(message));
        }

        let previous = {
            let mut table = self.table();
            match table.rows.get_mut(&record.id) {
                Some(row) => Some(std::mem::replace(row, record)),
                None => None,
            }
        };

        match previous {
            Some(previous) => {
                self.record(Undo::Replaced(previous));
                Ok(ExecOutcome::affected(1))
            }
            None => Ok(ExecOutcome::affected(0)),
        }
    }

    async fn delete(&self, id: i64) -> Result<ExecOutcome, StoreError> {
        let failures = self.enter().await?;
        if let Some(message) = failures.delete {
            return Err(StoreError::Query(message));
        }

        let removed = self.table().rows.remove(&id);
        match removed {
            Some(previous) => {
                self.record(Undo::Replaced(previous));
                Ok(ExecOutcome::affected(1))
            }
            None => Ok(ExecOutcome::affected(0)),
        }
    }

    async fn find_all(&self) -> Result<Vec<ToDoRecord>, StoreError> {
        let failures = self.enter().await?;
        if let Some(message) = failures.query {
            return Err(StoreError::Query(message));
        }

        Ok(self.table().rows.values().cloned().collect())
    }

    async fn release(&mut self) -> Result<(), StoreError> {
        if self.released {
            return Ok(());
        }
        if let Some(message) = self.provider.failures().release {
            return Err(StoreError::Connection(message));
        }

        self.released = true;
        lock(&self.undo).clear();
        self.provider
            .shared
            .counters
            .committed
            .fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for InMemoryConnection {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let undo = std::mem::take(&mut *lock(&self.undo));
        let mut table = self.table();
        for entry in undo.into_iter().rev() {
            match entry {
                Undo::Inserted(id) => {
                    table.rows.remove(&id);
                }
                Undo::Replaced(previous) => {
                    table.rows.insert(previous.id, previous);
                }
            }
        }
        drop(table);

        self.provider
            .shared
            .counters
            .rolled_back
            .fetch_add(1, Ordering::SeqCst);
    }
}

/// A poisoned lock only means another test thread panicked mid-write; the
/// map itself is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
