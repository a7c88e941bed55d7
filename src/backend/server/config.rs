/**
 * Server Configuration
 *
 * This module loads the server's configuration surface: the listen port,
 * the data file path, and the optional static-asset directory.
 *
 * # Configuration Sources
 *
 * Configuration comes from environment variables with defaults suitable
 * for local use:
 *
 * - `CHORESYNC_PORT` - listen port (default 8780)
 * - `CHORESYNC_DATA` - path of the JSON data file (default
 *   `chore-data.json` in the working directory)
 * - `CHORESYNC_STATIC` - directory to serve static files from; unset or
 *   empty disables static serving
 *
 * # Error Handling
 *
 * Invalid values are logged and replaced with defaults rather than
 * preventing startup; these knobs only affect where the store persists and
 * where the endpoints bind, never the sync protocol itself.
 */

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default REST/static listen port
pub const DEFAULT_PORT: u16 = 8780;

/// Default data file, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "chore-data.json";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the REST API, events stream, and static files
    pub port: u16,
    /// Path of the JSON data file
    pub data_path: PathBuf,
    /// Directory to serve static files from; `None` disables static serving
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        let port = match std::env::var("CHORESYNC_PORT") {
            Ok(raw) => match raw.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(
                        "[Config] CHORESYNC_PORT={} is not a port, using {}",
                        raw,
                        DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let data_path = std::env::var("CHORESYNC_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE));

        let static_dir = match std::env::var("CHORESYNC_STATIC") {
            Ok(dir) if !dir.is_empty() => {
                let dir = PathBuf::from(dir);
                if dir.is_dir() {
                    Some(dir)
                } else {
                    tracing::warn!(
                        "[Config] CHORESYNC_STATIC={} is not a directory, static serving disabled",
                        dir.display()
                    );
                    None
                }
            }
            _ => None,
        };

        Self { port, data_path, static_dir }
    }

    /// Socket address the server binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
