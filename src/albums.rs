use tracing::{debug, instrument, trace};

use crate::{
	storage::{AlbumStoreHandler, AtomicBatch},
	types::{Album, AlbumError, AlbumId, LIKES_FIELD, LIKES_RANKING_KEY},
};

/// Fetches the album stored under `id`.
///
/// An album whose hash has no fields does not exist and yields [`AlbumError::NotFound`]. Failing
/// to reach the store, or a record that does not deserialize into a full [`Album`], yields
/// [`AlbumError::Store`].
#[instrument(skip(store))]
pub async fn find<S>(store: &S, id: &str) -> Result<Album, AlbumError>
where
	S: AlbumStoreHandler + ?Sized,
{
	let id = AlbumId::from(id);

	trace!("Fetching album for ID: {}", id);

	let fields = store.hash_fields(&id.base_key()).await?;
	if fields.is_empty() {
		debug!("No album stored under {}", id.base_key());
		return Err(AlbumError::NotFound(id.to_string()));
	}

	Ok(Album::try_from(fields)?)
}

/// Adds one like to the album stored under `id`.
///
/// The `likes` field of the record and the album's score in the likes ranking are incremented
/// in the same [`AtomicBatch`], so the two never drift apart. Nothing is queued unless the
/// album exists.
///
/// A record deleted between the existence check and the commit is not guarded against; the
/// commit would then recreate a hash holding only `likes`.
#[instrument(skip(store))]
pub async fn increment_likes<S>(store: &S, id: &str) -> Result<(), AlbumError>
where
	S: AlbumStoreHandler + ?Sized,
{
	let id = AlbumId::from(id);
	let key = id.base_key();

	if !store.exists(&key).await? {
		debug!("Refusing to like missing album {}", key);
		return Err(AlbumError::NotFound(id.to_string()));
	}

	let batch = AtomicBatch::new()
		.hincr(key.as_str(), LIKES_FIELD, 1)
		.zincr(LIKES_RANKING_KEY, id.member(), 1.0);

	store.commit(batch).await?;

	debug!("Liked album {}", id);

	Ok(())
}

/// Reads the score of `id` in the likes ranking.
///
/// Returns `None` when `id` has no entry in the ranking.
#[instrument(skip(store))]
pub async fn ranking_score<S>(store: &S, id: &str) -> Result<Option<u64>, AlbumError>
where
	S: AlbumStoreHandler + ?Sized,
{
	let id = AlbumId::from(id);

	let score = store.score(LIKES_RANKING_KEY, id.member()).await?;

	// Scores only ever grow by whole likes.
	Ok(score.map(|score| score as u64))
}
