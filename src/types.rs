use std::{collections::HashMap, fmt::Display, str::FromStr};

/// Namespace prefix of every album hash key.
pub const ALBUM_NAMESPACE: &str = "album";
/// Key of the global sorted set ranking album ids by like count.
pub const LIKES_RANKING_KEY: &str = "likes";

pub const TITLE_FIELD: &str = "title";
pub const ARTIST_FIELD: &str = "artist";
pub const PRICE_FIELD: &str = "price";
pub const LIKES_FIELD: &str = "likes";

/// Identifier of a single album record.
///
/// The raw id is what clients send and what the ranking structure stores as its member. The
/// record itself lives under the namespaced [`AlbumId::base_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumId(String);

impl AlbumId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the key of the hash holding the album fields, e.g. `album:1`.
	pub fn base_key(&self) -> String {
		format!("{}:{}", ALBUM_NAMESPACE, self.0)
	}

	/// Returns the member name of this album in the likes ranking.
	pub fn member(&self) -> &str {
		&self.0
	}
}

impl Display for AlbumId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for AlbumId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

/// A fully populated album record.
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
	pub title: String,
	pub artist: String,
	/// Price in currency units.
	pub price: f64,
	pub likes: u64,
}

impl Album {
	/// Field mapping of the album as it is written to a hash.
	pub fn to_fields(&self) -> Vec<(&'static str, String)> {
		vec![
			(TITLE_FIELD, self.title.clone()),
			(ARTIST_FIELD, self.artist.clone()),
			(PRICE_FIELD, self.price.to_string()),
			(LIKES_FIELD, self.likes.to_string()),
		]
	}
}

impl TryFrom<HashMap<String, String>> for Album {
	type Error = StorageError;

	/// Builds an album from the fields of a non-empty hash.
	///
	/// Every field must be present and parse to its exact type, otherwise the record is
	/// rejected as a whole.
	fn try_from(mut fields: HashMap<String, String>) -> Result<Self, Self::Error> {
		let mut take = |field: &'static str| {
			fields.remove(field).ok_or(StorageError::MissingField(field))
		};

		let title = take(TITLE_FIELD)?;
		let artist = take(ARTIST_FIELD)?;
		let price = parse_field::<f64>(PRICE_FIELD, take(PRICE_FIELD)?)?;
		let likes = parse_field::<u64>(LIKES_FIELD, take(LIKES_FIELD)?)?;

		Ok(Self { title, artist, price, likes })
	}
}

fn parse_field<T: FromStr>(field: &'static str, value: String) -> Result<T, StorageError> {
	value.parse::<T>().map_err(|_| StorageError::Parsing { field, value })
}

/// Outcome of a failed album operation.
///
/// `NotFound` is kept apart from store failures so callers can answer "missing resource"
/// without conflating it with a broken store.
#[derive(Debug, thiserror::Error)]
pub enum AlbumError {
	#[error("No album found with id {0}")]
	NotFound(String),
	#[error(transparent)]
	Store(#[from] StorageError),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("Redis error: {0}")]
	Redis(#[from] redis::RedisError),
	#[error("Parsing error: field \"{field}\" has invalid value {value:?}")]
	Parsing { field: &'static str, value: String },
	/// Incrementing an integer field past `i64::MAX`, as Redis refuses `HINCRBY` to do.
	#[error("Increment of field \"{field}\" from {value} would overflow")]
	Overflow { field: &'static str, value: i64 },
	#[error("Parsing error: field \"{0}\" is missing")]
	MissingField(&'static str),
	#[error("Invalid store URL: {0}")]
	InvalidUrl(#[from] url::ParseError),
	/// The backend could not be reached.
	#[error("Store unavailable: {0}")]
	Unavailable(String),
}
