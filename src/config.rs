use std::str::FromStr;
use tracing::warn;

pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Default)]
pub struct PersistenceSettings {
    /// PostgreSQL sink when set, in-memory sink otherwise
    pub database_url: Option<String>,
}

/// Values used when a new match leaves them out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringDefaults {
    pub overs_limit: u32,
    pub wickets_limit: Option<u32>,
    pub reprompt_batters_each_over: bool,
}

impl Default for ScoringDefaults {
    fn default() -> Self {
        Self {
            overs_limit: 20,
            wickets_limit: Some(10),
            reprompt_batters_each_over: false,
        }
    }
}

pub struct AppConfig {
    pub server: ServerSettings,
    pub persistence: PersistenceSettings,
    pub scoring: ScoringDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server: ServerSettings::default(),
            persistence: PersistenceSettings::default(),
            scoring: ScoringDefaults::default(),
        }
    }

    /// Defaults overridden by `SCOREBOOK_*` and `DATABASE_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(bind_addr) = lookup("SCOREBOOK_BIND_ADDR") {
            config.server.bind_addr = bind_addr;
        }
        config.persistence.database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        if let Some(overs) = parse_var(&lookup, "SCOREBOOK_DEFAULT_OVERS") {
            config.scoring.overs_limit = overs;
        }
        if let Some(raw) = lookup("SCOREBOOK_DEFAULT_WICKETS") {
            // 0 turns the wicket limit off
            match raw.parse::<u32>() {
                Ok(0) => config.scoring.wickets_limit = None,
                Ok(wickets) => config.scoring.wickets_limit = Some(wickets),
                Err(_) => warn!(value = %raw, "Ignoring invalid SCOREBOOK_DEFAULT_WICKETS"),
            }
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring invalid setting");
            None
        }
    }
}
