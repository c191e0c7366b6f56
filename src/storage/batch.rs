/// A single mutation intent queued in an [`AtomicBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
	/// Increment an integer field of a hash (`HINCRBY`).
	HashIncrBy { key: String, field: &'static str, delta: i64 },
	/// Increment the score of a member in a sorted set (`ZINCRBY`).
	SortedSetIncrBy { key: String, member: String, delta: f64 },
}

/// Mutations that are submitted together and committed all-or-nothing.
///
/// Building a batch has no effect on the store; nothing is applied until the batch is handed to
/// [`AlbumStoreHandler::commit`](super::AlbumStoreHandler::commit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomicBatch {
	mutations: Vec<Mutation>,
}

impl AtomicBatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn hincr(mut self, key: impl Into<String>, field: &'static str, delta: i64) -> Self {
		self.mutations.push(Mutation::HashIncrBy { key: key.into(), field, delta });
		self
	}

	pub fn zincr(mut self, key: impl Into<String>, member: impl Into<String>, delta: f64) -> Self {
		self.mutations.push(Mutation::SortedSetIncrBy {
			key: key.into(),
			member: member.into(),
			delta,
		});
		self
	}

	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	pub fn len(&self) -> usize {
		self.mutations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mutations.is_empty()
	}
}

impl IntoIterator for AtomicBatch {
	type Item = Mutation;
	type IntoIter = std::vec::IntoIter<Mutation>;

	fn into_iter(self) -> Self::IntoIter {
		self.mutations.into_iter()
	}
}
