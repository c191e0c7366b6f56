use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
	storage::{memory::MemoryStore, AlbumStoreHandler, AtomicBatch},
	types::{Album, AlbumId, StorageError},
};

pub fn abbey_road() -> Album {
	Album {
		title: "Abbey Road".to_string(),
		artist: "The Beatles".to_string(),
		price: 21.50,
		likes: 5,
	}
}

/// A [`MemoryStore`] holding [`abbey_road`] under id `1`.
pub async fn seeded_store() -> Arc<MemoryStore> {
	let store = MemoryStore::new();
	store.insert_album(&AlbumId::new("1"), &abbey_road()).await;
	Arc::new(store)
}

/// Store returning hand-picked hash fields, for records another writer left malformed.
pub struct MockStore {
	pub fields: HashMap<String, String>,
}

impl MockStore {
	pub fn with_fields(fields: &[(&str, &str)]) -> Self {
		Self {
			fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
		}
	}
}

#[async_trait]
impl AlbumStoreHandler for MockStore {
	async fn hash_fields(&self, _key: &str) -> Result<HashMap<String, String>, StorageError> {
		Ok(self.fields.clone())
	}

	async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
		Ok(!self.fields.is_empty())
	}

	async fn score(&self, _key: &str, _member: &str) -> Result<Option<f64>, StorageError> {
		Ok(None)
	}

	async fn commit(&self, _batch: AtomicBatch) -> Result<(), StorageError> {
		Ok(())
	}
}
