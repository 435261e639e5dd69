use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use splitscreen_engine::{ConfigError, LoopConfig, Session, SessionConfig};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) const CONFIG_ENV_VAR: &str = "SPLITSCREEN_CONFIG";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Session,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path} at `{field}`: {message}")]
    ParseConfig {
        path: PathBuf,
        field: String,
        message: String,
    },
    #[error("invalid session configuration: {0}")]
    Session(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let session_config = load_session_config_from_env()?;
    let session = Session::from_config(&session_config, &mut rand::thread_rng())?;
    info!(
        players = session.scene().entity_count(),
        cameras = session.compositor().cameras().len(),
        world_width = session_config.world.width,
        world_height = session_config.world.height,
        "session_ready"
    );

    Ok(AppWiring {
        config: LoopConfig::from(&session_config),
        session,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_session_config_from_env() -> Result<SessionConfig, BootstrapError> {
    match env::var_os(CONFIG_ENV_VAR) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "config_loading");
            load_session_config(&path)
        }
        None => Ok(SessionConfig::default()),
    }
}

/// Reads and validates a JSON session config. Missing sections take their
/// defaults.
pub(crate) fn load_session_config(path: &Path) -> Result<SessionConfig, BootstrapError> {
    let raw = fs::read_to_string(path).map_err(|source| BootstrapError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_session_config(&raw).map_err(|error| BootstrapError::ParseConfig {
        path: path.to_path_buf(),
        field: error.path().to_string(),
        message: error.into_inner().to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

fn parse_session_config(
    raw: &str,
) -> Result<SessionConfig, serde_path_to_error::Error<serde_json::Error>> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer)
}
