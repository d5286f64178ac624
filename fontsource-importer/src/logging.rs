//! Tracing setup
//!
//! The subscriber is installed before configuration is loaded so that
//! config warnings are visible. Its filter starts from `RUST_LOG` (or
//! `info`) and is switched to the configured level once the config file
//! has been read, unless `RUST_LOG` is set.

use fontsource_common::{Error, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

pub const DEFAULT_LEVEL: &str = "info";

/// Handle for replacing the filter of an installed subscriber
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Build the fmt subscriber writing to `make_writer`
pub fn build_subscriber<W>(make_writer: W) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let initial = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let (filter, handle) = reload::Layer::new(initial);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer));
    (subscriber, handle)
}

/// Switch to the level from the config file; `RUST_LOG` takes precedence
pub fn apply_config_level(handle: &FilterHandle, level: &str) -> Result<()> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(());
    }
    let filter = EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("invalid logging level '{}': {}", level, e)))?;
    handle
        .reload(filter)
        .map_err(|e| Error::Internal(format!("failed to apply logging level: {}", e)))
}
