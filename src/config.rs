use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub lexicon_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        // File logging is opt-in: set LOG_DIR to get a daily-rolling file
        // alongside stdout.
        let log_dir = std::env::var("LOG_DIR").ok().map(PathBuf::from);

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let lexicon_path = std::env::var("LEXICON_PATH").ok().map(PathBuf::from);

        Self {
            host,
            port,
            log_level,
            log_dir,
            data_dir,
            lexicon_path,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("ellinaki"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}
