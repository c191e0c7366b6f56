use clap::Args;
use url::Url;

pub const DEFAULT_PROTOCOL: &str = "redis";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6379;

/// Connection settings of the Redis instance holding the albums.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
	/// Redis URL scheme, `redis` or `rediss`.
	#[arg(long = "redis-protocol", env = "REDIS_PROTOCOL", default_value = DEFAULT_PROTOCOL)]
	pub protocol: String,
	#[arg(long = "redis-host", env = "REDIS_HOST", default_value = DEFAULT_HOST)]
	pub host: String,
	#[arg(long = "redis-port", env = "REDIS_PORT", default_value_t = DEFAULT_PORT)]
	pub port: u16,
	#[arg(long = "redis-password", env = "REDIS_PASSWORD", default_value = "", hide_env_values = true)]
	pub password: String,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			protocol: DEFAULT_PROTOCOL.to_string(),
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
			password: String::new(),
		}
	}
}

impl StoreConfig {
	/// Connection URL understood by [`redis::Client::open`].
	///
	/// The password is percent-encoded into the userinfo and left out entirely when empty.
	pub fn url(&self) -> Result<Url, url::ParseError> {
		let mut url = Url::parse(&format!("{}://{}:{}/", self.protocol, self.host, self.port))?;

		if !self.password.is_empty() {
			url.set_password(Some(&self.password)).map_err(|_| url::ParseError::EmptyHost)?;
		}

		Ok(url)
	}
}
