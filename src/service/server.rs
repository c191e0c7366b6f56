use std::sync::Arc;

use axum::{
	body::Bytes,
	extract::{RawQuery, State},
	http::{header, Method, StatusCode},
	response::{IntoResponse, Redirect, Response},
	routing::any,
	Router,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::{
	albums,
	storage::AlbumStoreHandler,
	types::{Album, AlbumError},
};

/// Shared state of the HTTP service.
///
/// Handlers borrow the store for the duration of a single operation; the store decides how
/// connections are acquired underneath.
pub struct ApiService {
	pub store: Arc<dyn AlbumStoreHandler>,
	/// Symbol printed in front of album prices.
	pub currency: String,
}

impl ApiService {
	pub fn new(store: Arc<dyn AlbumStoreHandler>, currency: impl Into<String>) -> Self {
		Self { store, currency: currency.into() }
	}
}

pub fn router(state: Arc<ApiService>) -> Router {
	Router::new()
		.route("/album", any(show_album))
		.route("/like", any(like_album))
		.with_state(state)
}

/// Serves the router on `listener` until the server fails.
pub async fn serve(listener: TcpListener, state: Arc<ApiService>) -> std::io::Result<()> {
	if let Ok(addr) = listener.local_addr() {
		info!("Listening on http://{}", addr);
	}

	axum::serve(listener, router(state)).await
}

fn status(code: StatusCode) -> Response {
	(code, code.canonical_reason().unwrap_or_default()).into_response()
}

fn method_not_allowed(allowed: Method) -> Response {
	let code = StatusCode::METHOD_NOT_ALLOWED;
	(code, [(header::ALLOW, allowed.as_str())], code.canonical_reason().unwrap_or_default())
		.into_response()
}

fn album_error_to_response(err: AlbumError) -> Response {
	match err {
		AlbumError::NotFound(_) => status(StatusCode::NOT_FOUND),
		AlbumError::Store(e) => {
			error!("Store error: {}", e);
			status(StatusCode::INTERNAL_SERVER_ERROR)
		},
	}
}

/// Plain text rendering of an album, e.g. `Abbey Road by The Beatles: £21.50 [5 likes]`,
/// followed by a space and a newline.
fn render_album(album: &Album, currency: &str) -> String {
	format!(
		"{} by {}: {}{:.2} [{} likes] \n",
		album.title, album.artist, currency, album.price, album.likes
	)
}

/// First `id` of an urlencoded query or form body.
///
/// Repeated ids are not an error, later values are ignored. Returns `None` if the first `id` is
/// missing or empty.
fn first_id(input: &[u8]) -> Option<String> {
	url::form_urlencoded::parse(input)
		.find(|(key, _)| key == "id")
		.map(|(_, id)| id.into_owned())
		.filter(|id| !id.is_empty())
}

async fn show_album(
	State(state): State<Arc<ApiService>>,
	method: Method,
	RawQuery(query): RawQuery,
) -> Response {
	if method != Method::GET {
		return method_not_allowed(Method::GET);
	}

	let Some(id) = query.as_deref().and_then(|query| first_id(query.as_bytes())) else {
		warn!("Album requested without an id");
		return status(StatusCode::BAD_REQUEST);
	};

	match albums::find(state.store.as_ref(), &id).await {
		Ok(album) => (
			StatusCode::OK,
			[(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
			render_album(&album, &state.currency),
		)
			.into_response(),
		Err(e) => album_error_to_response(e),
	}
}

async fn like_album(
	State(state): State<Arc<ApiService>>,
	method: Method,
	body: Bytes,
) -> Response {
	if method != Method::POST {
		return method_not_allowed(Method::POST);
	}

	let Some(id) = first_id(&body) else {
		warn!("Like submitted without an id");
		return status(StatusCode::BAD_REQUEST);
	};

	match albums::increment_likes(state.store.as_ref(), &id).await {
		Ok(()) => {
			let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
			Redirect::to(&format!("/album?id={}", id)).into_response()
		},
		Err(e) => album_error_to_response(e),
	}
}
