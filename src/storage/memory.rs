use std::{
	collections::HashMap,
	sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::types::{Album, AlbumId, StorageError, LIKES_RANKING_KEY};

use super::{AlbumStoreHandler, AtomicBatch, Mutation};

#[derive(Debug, Default)]
struct Keyspace {
	hashes: HashMap<String, HashMap<String, String>>,
	sorted_sets: HashMap<String, HashMap<String, f64>>,
}

/// In-process implementation of [`AlbumStoreHandler`].
///
/// Holds hashes and sorted sets behind a single lock. A committed batch is applied under one
/// write guard, so readers see either none or all of its mutations.
#[derive(Debug)]
pub struct MemoryStore {
	keyspace: RwLock<Keyspace>,
	available: AtomicBool,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryStore {
	pub fn new() -> Self {
		Self { keyspace: RwLock::new(Keyspace::default()), available: AtomicBool::new(true) }
	}

	/// Writes `album` as a whole under the key of `id`, replacing any previous record, and sets
	/// its likes ranking score to match.
	pub async fn insert_album(&self, id: &AlbumId, album: &Album) {
		let fields =
			album.to_fields().into_iter().map(|(field, value)| (field.to_string(), value)).collect();

		let mut keyspace = self.keyspace.write().await;
		keyspace.hashes.insert(id.base_key(), fields);
		keyspace
			.sorted_sets
			.entry(LIKES_RANKING_KEY.to_string())
			.or_default()
			.insert(id.member().to_string(), album.likes as f64);
	}

	/// Simulates losing (or regaining) the connection to the store.
	///
	/// While unavailable every operation fails with [`StorageError::Unavailable`].
	pub fn set_available(&self, available: bool) {
		self.available.store(available, Ordering::SeqCst);
	}

	fn ensure_available(&self) -> Result<(), StorageError> {
		if self.available.load(Ordering::SeqCst) {
			Ok(())
		} else {
			error!("Memory store is unavailable");
			Err(StorageError::Unavailable("memory store is disconnected".to_string()))
		}
	}
}

#[async_trait]
impl AlbumStoreHandler for MemoryStore {
	async fn hash_fields(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
		self.ensure_available()?;

		Ok(self.keyspace.read().await.hashes.get(key).cloned().unwrap_or_default())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		self.ensure_available()?;

		let keyspace = self.keyspace.read().await;
		Ok(keyspace.hashes.contains_key(key) || keyspace.sorted_sets.contains_key(key))
	}

	async fn score(&self, key: &str, member: &str) -> Result<Option<f64>, StorageError> {
		self.ensure_available()?;

		Ok(self
			.keyspace
			.read()
			.await
			.sorted_sets
			.get(key)
			.and_then(|set| set.get(member))
			.copied())
	}

	async fn commit(&self, batch: AtomicBatch) -> Result<(), StorageError> {
		self.ensure_available()?;

		let mut keyspace = self.keyspace.write().await;

		// Every hash increment is computed up front so a failing one rejects the whole batch
		// before anything is written.
		let mut staged: HashMap<(String, &'static str), i64> = HashMap::new();
		for mutation in batch.mutations() {
			if let Mutation::HashIncrBy { key, field, delta } = mutation {
				let current = match staged.get(&(key.clone(), *field)) {
					Some(current) => *current,
					None => match keyspace.hashes.get(key).and_then(|hash| hash.get(*field)) {
						Some(value) => value.parse::<i64>().map_err(|_| {
							error!("Cannot increment non-integer member {} of {} key", field, key);
							StorageError::Parsing { field: *field, value: value.clone() }
						})?,
						None => 0,
					},
				};

				let next = current.checked_add(*delta).ok_or_else(|| {
					error!("Incrementing {} of {} key by {} would overflow", field, key, delta);
					StorageError::Overflow { field: *field, value: current }
				})?;
				staged.insert((key.clone(), *field), next);
			}
		}

		for ((key, field), value) in staged {
			keyspace.hashes.entry(key).or_default().insert(field.to_string(), value.to_string());
			debug!("Set {} to {}", field, value);
		}

		for mutation in batch {
			if let Mutation::SortedSetIncrBy { key, member, delta } = mutation {
				let score = keyspace.sorted_sets.entry(key).or_default().entry(member).or_default();
				*score += delta;
				debug!("Incremented score by {} to {}", delta, score);
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mock::abbey_road;

	#[tokio::test]
	async fn missing_hash_reads_as_empty() {
		let store = MemoryStore::new();

		assert!(store.hash_fields("album:42").await.unwrap().is_empty());
		assert!(!store.exists("album:42").await.unwrap());
		assert_eq!(store.score("likes", "42").await.unwrap(), None);
	}

	#[tokio::test]
	async fn insert_album_writes_every_field() {
		let store = MemoryStore::new();
		let id = AlbumId::new("1");
		store.insert_album(&id, &abbey_road()).await;

		let fields = store.hash_fields("album:1").await.unwrap();

		assert_eq!(fields.len(), 4);
		assert_eq!(fields["title"], "Abbey Road");
		assert_eq!(fields["likes"], "5");
		assert!(store.exists("album:1").await.unwrap());
		assert_eq!(store.score("likes", "1").await.unwrap(), Some(5.0));
	}

	#[tokio::test]
	async fn commit_applies_every_mutation() {
		let store = MemoryStore::new();
		store.insert_album(&AlbumId::new("1"), &abbey_road()).await;

		let batch = AtomicBatch::new().hincr("album:1", "likes", 2).zincr("likes", "1", 2.0);
		store.commit(batch).await.unwrap();

		assert_eq!(store.hash_fields("album:1").await.unwrap()["likes"], "7");
		assert_eq!(store.score("likes", "1").await.unwrap(), Some(7.0));
	}

	#[tokio::test]
	async fn failing_mutation_aborts_the_whole_batch() {
		let store = MemoryStore::new();
		store.insert_album(&AlbumId::new("1"), &abbey_road()).await;

		// "title" is not an integer, so the ranking increment queued before it must not land.
		let batch = AtomicBatch::new().zincr("likes", "1", 1.0).hincr("album:1", "title", 1);
		let res = store.commit(batch).await;

		assert!(matches!(res, Err(StorageError::Parsing { field: "title", .. })));
		assert_eq!(store.score("likes", "1").await.unwrap(), Some(5.0));
	}

	#[tokio::test]
	async fn increments_of_one_field_accumulate_within_a_batch() {
		let store = MemoryStore::new();
		store.insert_album(&AlbumId::new("1"), &abbey_road()).await;

		let batch = AtomicBatch::new().hincr("album:1", "likes", 1).hincr("album:1", "likes", 1);
		store.commit(batch).await.unwrap();

		assert_eq!(store.hash_fields("album:1").await.unwrap()["likes"], "7");
	}

	#[tokio::test]
	async fn overflowing_increment_aborts_the_whole_batch() {
		let store = MemoryStore::new();
		let album = Album { likes: i64::MAX as u64, ..abbey_road() };
		store.insert_album(&AlbumId::new("1"), &album).await;

		let batch = AtomicBatch::new().zincr("likes", "1", 1.0).hincr("album:1", "likes", 1);
		let res = store.commit(batch).await;

		assert!(matches!(res, Err(StorageError::Overflow { field: "likes", value: i64::MAX })));
		assert_eq!(store.hash_fields("album:1").await.unwrap()["likes"], i64::MAX.to_string());
		assert_eq!(store.score("likes", "1").await.unwrap(), Some(i64::MAX as f64));
	}

	#[tokio::test]
	async fn unavailable_store_fails_every_operation() {
		let store = MemoryStore::new();
		store.set_available(false);

		assert!(matches!(store.hash_fields("album:1").await, Err(StorageError::Unavailable(_))));
		assert!(matches!(store.exists("album:1").await, Err(StorageError::Unavailable(_))));
		assert!(matches!(
			store.commit(AtomicBatch::new().zincr("likes", "1", 1.0)).await,
			Err(StorageError::Unavailable(_))
		));

		store.set_available(true);
		assert!(store.exists("album:1").await.is_ok());
	}
}
