use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::StorageError;

pub mod batch;
pub mod memory;
pub mod redis;

pub use batch::{AtomicBatch, Mutation};

/// A storage handler trait exposing the key-value primitives album operations are built from.
///
/// # Usage
///
/// Implementations wrap a concrete backend, such as a Redis server or an in-process map, and are
/// handed to the operations in [`crate::albums`] explicitly. A handler must be safe to share
/// between concurrent requests; any connection it needs is acquired per call and released when
/// the call returns.
///
/// Checkout the out of the box implementation [`redis::RedisStore`], and [`memory::MemoryStore`]
/// for running without a server.
#[async_trait]
pub trait AlbumStoreHandler: Send + Sync {
	/// Reads every field of the hash stored at `key`.
	///
	/// Returns an empty map when the key does not exist.
	async fn hash_fields(&self, key: &str) -> Result<HashMap<String, String>, StorageError>;
	/// Checks whether `key` exists.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
	/// Reads the score of `member` in the sorted set stored at `key`.
	///
	/// Returns `None` if either the set or the member does not exist.
	async fn score(&self, key: &str, member: &str) -> Result<Option<f64>, StorageError>;
	/// Applies every mutation of `batch` as one indivisible unit.
	///
	/// Either all mutations are applied or none are, and no other operation observes the store
	/// in between. The replies of the individual mutations are discarded.
	async fn commit(&self, batch: AtomicBatch) -> Result<(), StorageError>;
}
