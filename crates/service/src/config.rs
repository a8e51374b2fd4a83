use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the HTML console to listen on.
    ///  if not set then 0.0.0.0:8080 will be used
    pub listen_addr: SocketAddr,

    // snapshot configuration
    /// a JSON file holding the session and collection snapshots
    ///  to serve, if not set the console starts empty
    pub snapshot_path: Option<PathBuf>,

    // action queue configuration
    /// maximum number of queued workflow actions, None means unbounded
    pub max_queue_size: Option<usize>,
    /// artificial latency applied by the local effect worker
    ///  before an action lands in the snapshot
    pub effect_delay: Duration,

    // misc
    pub log_level: tracing::Level,

    // ui configuration
    /// run the HTML UI in read-only mode (hides workflow actions)
    pub read_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080),
            snapshot_path: None,
            max_queue_size: Some(64),
            effect_delay: Duration::ZERO,
            log_level: tracing::Level::INFO,
            read_only: false,
        }
    }
}
