//! Test fixtures for exid.
//!
//! - [`MemoryStore`]: an in-memory [`RecordStore`] with call counting
//! - [`Voucher`] and [`Organization`]: sample record types
//! - [`init_tracing`]: a `RUST_LOG`-driven subscriber for test output

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use exid::{Criteria, Record, RecordStore, Relation, StoreError, Uuid};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// In-memory store for any cloneable record type.
///
/// Rows live behind a shared lock, so a [`Relation`] built before an insert
/// sees the insert when it is loaded.
pub struct MemoryStore<T> {
    rows: Arc<Mutex<Vec<T>>>,
    queries: AtomicUsize,
}

impl<T: Record + Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = T>) -> Self {
        let store = Self::new();
        for row in rows {
            store.insert(row);
        }
        store
    }

    pub fn insert(&self, row: T) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `where_eq` calls made so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl<T: Record + Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record + Clone> RecordStore for MemoryStore<T> {
    type Record = T;

    fn where_eq(&self, field: &str, value: &str) -> Result<Relation<T>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let rows = Arc::clone(&self.rows);
        let (f, v) = (field.to_string(), value.to_string());

        Ok(Relation::new(Criteria::new(T::TYPE_NAME, field, value), move || {
            let rows = rows
                .lock()
                .map_err(|_| StoreError::Backend("memory store poisoned".into()))?;
            Ok(rows
                .iter()
                .filter(|row| row.field_value(&f).as_deref() == Some(v.as_str()))
                .cloned()
                .collect())
        }))
    }
}

/// Sample record keyed by a `uuid` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voucher {
    pub uuid: Uuid,
    pub code: String,
}

impl Voucher {
    pub fn new(uuid: &str, code: &str) -> Self {
        Self {
            uuid: Uuid::parse_str(uuid).unwrap(),
            code: code.to_string(),
        }
    }

    pub fn random(code: &str) -> Self {
        Self {
            uuid: Uuid::now_v7(),
            code: code.to_string(),
        }
    }
}

impl Record for Voucher {
    const TYPE_NAME: &'static str = "Voucher";

    fn field_value(&self, field: &str) -> Option<String> {
        (field == "uuid").then(|| self.uuid.hyphenated().to_string())
    }
}

/// Sample record whose EID field is not its primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: i64,
    pub external_id: Option<Uuid>,
    pub name: String,
}

impl Organization {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            external_id: Some(Uuid::now_v7()),
            name: name.to_string(),
        }
    }
}

impl Record for Organization {
    const TYPE_NAME: &'static str = "Organization";

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "external_id" => self.external_id.map(|u| u.hyphenated().to_string()),
            "id" => Some(self.id.to_string()),
            _ => None,
        }
    }
}
