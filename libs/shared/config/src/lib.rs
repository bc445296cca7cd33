use std::env;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStartPolicySetting {
    /// Start today's slots the way the booking page always has.
    #[default]
    Legacy,
    /// Start today's slots at the first interval boundary at or after now.
    NextInterval,
}

impl SlotStartPolicySetting {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Some(Self::Legacy),
            "next-interval" | "next_interval" => Some(Self::NextInterval),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub port: u16,
    pub slot_start_policy: SlotStartPolicySetting,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("BACKEND_URL not set, using empty value");
                    String::new()
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|port| match port.parse() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("PORT is not a valid port number: {}", port);
                        None
                    }
                })
                .unwrap_or(3000),
            slot_start_policy: env::var("SLOT_START_POLICY")
                .ok()
                .and_then(|value| {
                    let parsed = SlotStartPolicySetting::parse(&value);
                    if parsed.is_none() {
                        warn!("Unknown SLOT_START_POLICY '{}', using legacy", value);
                    }
                    parsed
                })
                .unwrap_or_default(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty()
    }
}
