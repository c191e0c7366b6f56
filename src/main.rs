use std::{error::Error, sync::Arc};

use album_likes::{
	service::server::{self, ApiService},
	RedisStore, StoreConfig,
};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::fmt;

#[derive(Parser, Debug)]
struct Args {
	/// Address to bind to.
	#[arg(long, default_value = "0.0.0.0", env = "ALBUMS_BIND")]
	bind: String,
	/// Port to listen on.
	#[arg(long, default_value_t = 4000, env = "ALBUMS_PORT")]
	port: u16,
	/// Currency symbol printed in front of prices.
	#[arg(long, default_value = "£", env = "ALBUMS_CURRENCY")]
	currency: String,
	#[command(flatten)]
	store: StoreConfig,
	/// Log level
	#[arg(long, default_value = "info")]
	log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	// Loaded first so `.env` entries can back the arguments below.
	dotenv::dotenv().ok();

	let args = Args::parse();

	let subscriber = fmt::Subscriber::builder().with_max_level(args.log_level).finish();
	tracing::subscriber::set_global_default(subscriber)?;

	info!(task = "tracing_setup", result = "success", "tracing successfully set up");

	let store = RedisStore::from_config(&args.store)?;
	info!(
		task = "store_setup",
		host = %args.store.host,
		port = args.store.port,
		"redis client initialized"
	);

	let state = Arc::new(ApiService::new(Arc::new(store), args.currency));

	let addr = format!("{}:{}", args.bind, args.port);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	server::serve(listener, state).await?;

	Ok(())
}
