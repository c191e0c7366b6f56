use std::collections::HashMap;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::{debug, error, instrument};

use crate::{config::StoreConfig, types::StorageError};

use super::{AlbumStoreHandler, AtomicBatch, Mutation};

/// Default implementation of [`AlbumStoreHandler`].
///
/// Storing and retrieving data using a Redis instance. The store only holds the [`Client`];
/// every operation opens its own connection and drops it once the reply is in, so concurrent
/// operations never share a connection.
#[derive(Debug, Clone)]
pub struct RedisStore {
	client: Client,
}

impl RedisStore {
	/// Creates a store for the Redis instance at `url`.
	///
	/// No connection is made until the first operation.
	pub fn open(url: &str) -> Result<Self, StorageError> {
		let client = Client::open(url).map_err(|e| {
			error!("Failed to initialize Redis client: {}", e);
			StorageError::Redis(e)
		})?;

		Ok(Self { client })
	}

	pub fn from_config(config: &StoreConfig) -> Result<Self, StorageError> {
		let url = config.url().map_err(|e| {
			error!("Invalid Redis connection settings: {}", e);
			StorageError::InvalidUrl(e)
		})?;

		Self::open(url.as_str())
	}

	async fn connection(&self) -> Result<MultiplexedConnection, StorageError> {
		let con = self.client.get_multiplexed_async_connection().await.map_err(|e| {
			error!("Failed to connect to Redis: {}", e);
			StorageError::Redis(e)
		})?;
		debug!("Connected to Redis");

		Ok(con)
	}
}

#[async_trait]
impl AlbumStoreHandler for RedisStore {
	#[instrument(skip(self))]
	async fn hash_fields(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
		let mut con = self.connection().await?;

		let fields: HashMap<String, String> = con.hgetall(key).await.map_err(|e| {
			error!("Failed to get members of {} key: {}", key, e);
			StorageError::Redis(e)
		})?;

		debug!("Read {} members from {} key", fields.len(), key);

		Ok(fields)
	}

	#[instrument(skip(self))]
	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let mut con = self.connection().await?;

		con.exists(key).await.map_err(|e| {
			error!("Failed to check if {} key exists: {}", key, e);
			StorageError::Redis(e)
		})
	}

	#[instrument(skip(self))]
	async fn score(&self, key: &str, member: &str) -> Result<Option<f64>, StorageError> {
		let mut con = self.connection().await?;

		con.zscore(key, member).await.map_err(|e| {
			error!("Failed to get score of {} in {} key: {}", member, key, e);
			StorageError::Redis(e)
		})
	}

	#[instrument(skip(self, batch), fields(mutations = batch.len()))]
	async fn commit(&self, batch: AtomicBatch) -> Result<(), StorageError> {
		let mut con = self.connection().await?;

		// MULTI ... EXEC, nothing below is executed before the pipeline is sent.
		let mut pipe = redis::pipe();
		pipe.atomic();

		for mutation in batch {
			match mutation {
				Mutation::HashIncrBy { key, field, delta } => {
					pipe.hincr(&key, field, delta).ignore();
					debug!("Queued HINCRBY {} {} {}", key, field, delta);
				},
				Mutation::SortedSetIncrBy { key, member, delta } => {
					pipe.zincr(&key, &member, delta).ignore();
					debug!("Queued ZINCRBY {} {} {}", key, delta, member);
				},
			}
		}

		pipe.query_async::<_, ()>(&mut con).await.map_err(|e| {
			error!("Failed to execute transaction: {}", e);
			StorageError::Redis(e)
		})?;

		debug!("Transaction committed");

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{albums, types::AlbumError};

	/// Nothing listens on port 1, so every connection attempt is refused.
	fn disconnected_store() -> RedisStore {
		RedisStore::open("redis://127.0.0.1:1/").expect("valid redis url")
	}

	#[test]
	fn open_rejects_invalid_url() {
		assert!(matches!(RedisStore::open("not a url"), Err(StorageError::Redis(_))));
	}

	#[test]
	fn from_config_accepts_reserved_password_characters() {
		let config = StoreConfig { password: "p@ss/w:rd".to_string(), ..StoreConfig::default() };

		assert!(RedisStore::from_config(&config).is_ok());
	}

	#[test]
	fn from_config_rejects_invalid_host() {
		let config = StoreConfig { host: "bad host".to_string(), ..StoreConfig::default() };

		assert!(matches!(RedisStore::from_config(&config), Err(StorageError::InvalidUrl(_))));
	}

	#[tokio::test]
	async fn find_on_disconnected_store_is_a_store_error() {
		let store = disconnected_store();

		let res = albums::find(&store, "1").await;

		assert!(matches!(res, Err(AlbumError::Store(StorageError::Redis(_)))));
	}

	#[tokio::test]
	async fn increment_on_disconnected_store_is_a_store_error() {
		let store = disconnected_store();

		let res = albums::increment_likes(&store, "1").await;

		assert!(matches!(res, Err(AlbumError::Store(StorageError::Redis(_)))));
	}
}
