//! Album records served from a key-value store, with an atomic "like" counter.
//!
//! Every album lives in a hash under `album:<id>` holding its `title`, `artist`, `price` and
//! `likes`. A global sorted set under `likes` ranks album ids by the same like count.
//!
//! The core is two operations in [`albums`]:
//!
//! - [`albums::find`] reads a whole album, telling a missing album
//!   ([`AlbumError::NotFound`]) apart from a failing store ([`AlbumError::Store`]).
//! - [`albums::increment_likes`] checks that the album exists and then commits the increment of
//!   its `likes` field and of its ranking score as one [`AtomicBatch`], so the two counters never
//!   disagree.
//!
//! Both are written against the [`AlbumStoreHandler`] trait and take the store as an argument.
//! [`RedisStore`] is the default backend; [`MemoryStore`] keeps everything in process.
//!
//! For the default backend you must run a Redis instance and may set the following environment
//! variables:
//!
//! - `REDIS_PROTOCOL`
//! - `REDIS_HOST`
//! - `REDIS_PORT`
//! - `REDIS_PASSWORD`
//!
//! # Example
//!
//! ```ignore
//! use album_likes::{albums, RedisStore};
//!
//! #[tokio::main]
//! async fn main() {
//!   let store = RedisStore::open("redis://localhost:6379/").unwrap();
//!
//!   albums::increment_likes(&store, "1").await.unwrap();
//!   let album = albums::find(&store, "1").await.unwrap();
//!
//!   println!("{} by {} has {} likes", album.title, album.artist, album.likes);
//! }
//! ```

pub mod albums;
pub mod config;
pub mod service;
pub mod storage;
pub mod types;

#[cfg(test)]
mod mock;

pub use config::StoreConfig;
pub use storage::{memory::MemoryStore, redis::RedisStore, AlbumStoreHandler, AtomicBatch, Mutation};
pub use types::{Album, AlbumError, AlbumId, StorageError};
