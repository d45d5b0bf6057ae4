use std::time::Duration;

use capture_go::game::{DEFAULT_WIN_SCORE, Rules};
use capture_go::network::PORT;
use capture_go::restart::DEFAULT_RESTART_DELAY;
use serde::{Deserialize, Serialize};


#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub win_score: u32,
    // Written like "5s" or "1m 30s".
    #[serde(with = "humantime_serde")]
    pub restart_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: PORT,
            win_score: DEFAULT_WIN_SCORE,
            restart_delay: DEFAULT_RESTART_DELAY,
        }
    }
}

impl ServerConfig {
    pub fn rules(&self) -> Rules {
        Rules {
            win_score: self.win_score,
            restart_delay: self.restart_delay,
        }
    }
}

pub fn parse(contents: &str) -> anyhow::Result<ServerConfig> {
    let config: ServerConfig = serde_yaml::from_str(contents)?;
    anyhow::ensure!(config.win_score > 0, "win_score must be positive");
    Ok(config)
}
