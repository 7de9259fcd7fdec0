//! Interface to the data store that holds records.
//!
//! The store is supplied by the host application. All this crate needs is a
//! field-equality query that returns a lazy [`Relation`], plus an
//! "exactly one" lookup.

use std::fmt;
use std::sync::Arc;

use crate::error::StoreError;
use crate::record::Record;

/// The `field = value` condition behind a [`Relation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Criteria {
    pub type_name: String,
    pub field: String,
    pub value: String,
}

impl Criteria {
    pub fn new(
        type_name: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    fn not_found(&self) -> StoreError {
        StoreError::RecordNotFound {
            type_name: self.type_name.clone(),
            field: self.field.clone(),
            value: self.value.clone(),
        }
    }

    fn ambiguous(&self, count: usize) -> StoreError {
        StoreError::AmbiguousRecord {
            type_name: self.type_name.clone(),
            field: self.field.clone(),
            value: self.value.clone(),
            count,
        }
    }
}

type Loader<R> = Arc<dyn Fn() -> Result<Vec<R>, StoreError> + Send + Sync>;

/// A deferred query result.
///
/// Nothing is read from the store until one of [`load`](Self::load),
/// [`first`](Self::first), or [`sole`](Self::sole) is called, and each call
/// runs the query again.
pub struct Relation<R> {
    criteria: Criteria,
    loader: Loader<R>,
}

impl<R> Relation<R> {
    pub fn new<F>(criteria: Criteria, loader: F) -> Self
    where
        F: Fn() -> Result<Vec<R>, StoreError> + Send + Sync + 'static,
    {
        Self {
            criteria,
            loader: Arc::new(loader),
        }
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Runs the query and returns every matching record.
    pub fn load(&self) -> Result<Vec<R>, StoreError> {
        (self.loader)()
    }

    /// Returns the first matching record, if any.
    pub fn first(&self) -> Result<Option<R>, StoreError> {
        Ok(self.load()?.into_iter().next())
    }

    /// Returns the only matching record.
    ///
    /// Fails with `RecordNotFound` when nothing matches and
    /// `AmbiguousRecord` when several rows do.
    pub fn sole(&self) -> Result<R, StoreError> {
        let mut rows = self.load()?;
        match rows.len() {
            0 => Err(self.criteria.not_found()),
            1 => Ok(rows.remove(0)),
            n => Err(self.criteria.ambiguous(n)),
        }
    }
}

impl<R: 'static> Relation<R> {
    /// Converts each loaded record with `f`, keeping the query deferred.
    pub fn map<U, F>(self, f: F) -> Relation<U>
    where
        F: Fn(R) -> U + Send + Sync + 'static,
    {
        let loader = self.loader;
        Relation::new(self.criteria, move || {
            Ok(loader()?.into_iter().map(&f).collect())
        })
    }
}

impl<R> Clone for Relation<R> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<R> fmt::Debug for Relation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}

/// A data store for one record type.
pub trait RecordStore: Send + Sync + 'static {
    type Record: Record;

    /// Builds a lazy `field = value` query.
    fn where_eq(&self, field: &str, value: &str) -> Result<Relation<Self::Record>, StoreError>;

    /// Returns the single record with `field = value`.
    fn find_sole_by(&self, field: &str, value: &str) -> Result<Self::Record, StoreError> {
        self.where_eq(field, value)?.sole()
    }
}

/// Type-erased view of a [`RecordStore`] whose records convert into `R`.
///
/// This is what registry entries hold, so stores of different record types
/// can share one registry.
pub trait RecordSource<R>: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn select(&self, field: &str, value: &str) -> Result<Relation<R>, StoreError>;
}

impl<S, R> RecordSource<R> for S
where
    S: RecordStore,
    R: From<S::Record> + 'static,
{
    fn type_name(&self) -> &'static str {
        <S::Record as Record>::TYPE_NAME
    }

    fn select(&self, field: &str, value: &str) -> Result<Relation<R>, StoreError> {
        Ok(self.where_eq(field, value)?.map(R::from))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn relation(rows: Vec<u32>) -> Relation<u32> {
        Relation::new(Criteria::new("Row", "uuid", "v"), move || Ok(rows.clone()))
    }

    #[test]
    fn test_relation_is_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rel = Relation::new(Criteria::new("Row", "uuid", "v"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1])
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(rel.load().unwrap(), vec![1]);
        assert_eq!(rel.load().unwrap(), vec![1]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_first() {
        assert_eq!(relation(vec![]).first().unwrap(), None);
        assert_eq!(relation(vec![7, 8]).first().unwrap(), Some(7));
    }

    #[test]
    fn test_sole() {
        assert_eq!(relation(vec![7]).sole().unwrap(), 7);

        assert_eq!(
            relation(vec![]).sole().unwrap_err(),
            StoreError::RecordNotFound {
                type_name: "Row".into(),
                field: "uuid".into(),
                value: "v".into(),
            }
        );

        assert!(matches!(
            relation(vec![1, 2, 3]).sole().unwrap_err(),
            StoreError::AmbiguousRecord { count: 3, .. }
        ));
    }

    #[test]
    fn test_map() {
        let rel = relation(vec![1, 2]).map(|n| n * 10);
        assert_eq!(rel.load().unwrap(), vec![10, 20]);
        assert_eq!(rel.criteria().field, "uuid");
    }

    #[test]
    fn test_backend_error_propagates() {
        let rel: Relation<u32> = Relation::new(Criteria::new("Row", "uuid", "v"), || {
            Err(StoreError::Backend("connection reset".into()))
        });
        assert!(rel.first().is_err());
        assert!(rel.sole().is_err());
    }
}
