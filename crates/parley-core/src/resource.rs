//! Resource trait definition.
//!
//! The uniform CRUD-plus-query contract every storage backend implements.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition). Backend
//! selection is a composition decision made once at process startup; call
//! sites never branch on which backend is active.

use parley_types::error::StorageError;
use uuid::Uuid;

/// Storage contract over one entity type.
///
/// Implementations live in parley-infra (sqlx mapped, sqlx raw-statement,
/// in-memory). All three behave identically from the caller's perspective:
///
/// - Not-found is `Ok(None)`, never an error.
/// - Filters combine every supplied, non-empty field with logical AND.
///   `find` with zero usable fields returns `None`; `find_all` with zero
///   usable fields returns every record.
/// - `find_all` over messages is ordered ascending by creation time; for
///   other entities the order carries no meaning.
pub trait Resource: Send + Sync {
    /// The stored entity.
    type Entity: Send;
    /// Pre-insert input; id and timestamps are assigned by the backend.
    type Create: Send;
    /// Conjunctive partial filter.
    type Filter: Send + Sync;
    /// Partial update; only present fields are applied.
    type Patch: Send + Sync;

    /// Assign a fresh id and current timestamps, persist, and return the
    /// full stored record.
    fn create(
        &self,
        input: Self::Create,
    ) -> impl std::future::Future<Output = Result<Self::Entity, StorageError>> + Send;

    /// Single-record lookup by primary identifier.
    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Self::Entity>, StorageError>> + Send;

    /// First match of the conjunctive filter, or `None` when the filter has
    /// zero usable fields.
    fn find(
        &self,
        filter: &Self::Filter,
    ) -> impl std::future::Future<Output = Result<Option<Self::Entity>, StorageError>> + Send;

    /// Every match of the conjunctive filter; zero usable fields returns
    /// every record.
    fn find_all(
        &self,
        filter: &Self::Filter,
    ) -> impl std::future::Future<Output = Result<Vec<Self::Entity>, StorageError>> + Send;

    /// Apply the present fields and return the current record afterward.
    ///
    /// An empty patch is a no-op that still re-fetches: it returns the
    /// unchanged record without touching `updated_at`. `None` only when the
    /// id itself no longer exists.
    fn update(
        &self,
        id: &Uuid,
        patch: &Self::Patch,
    ) -> impl std::future::Future<Output = Result<Option<Self::Entity>, StorageError>> + Send;

    /// Remove and return the prior value, or `None` if it never existed.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Self::Entity>, StorageError>> + Send;
}
