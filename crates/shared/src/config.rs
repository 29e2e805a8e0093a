//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Club operating rules.
    #[serde(default)]
    pub club: ClubConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Operating rules of the club that the booking engine depends on.
#[derive(Debug, Clone, Deserialize)]
pub struct ClubConfig {
    /// IANA timezone the club operates in; all calendar days are local to it.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// How long a checkout hold stays active.
    #[serde(default = "default_hold_ttl_minutes")]
    pub hold_ttl_minutes: i64,
    /// Maximum occupants per booked room.
    #[serde(default = "default_max_room_occupants")]
    pub max_room_occupants: u32,
    /// First photoshoot block starts at this hour.
    #[serde(default = "default_photoshoot_opening_hour")]
    pub photoshoot_opening_hour: u32,
    /// Last photoshoot block must end by this hour.
    #[serde(default = "default_photoshoot_closing_hour")]
    pub photoshoot_closing_hour: u32,
    /// Upper bound for `limit` on list operations.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Longest date range, in days, a single booking, hold or reservation may cover.
    #[serde(default = "default_max_booking_days")]
    pub max_booking_days: u32,
}

fn default_timezone() -> String {
    "Asia/Karachi".to_string()
}

fn default_hold_ttl_minutes() -> i64 {
    15
}

fn default_max_room_occupants() -> u32 {
    6
}

fn default_photoshoot_opening_hour() -> u32 {
    9
}

fn default_photoshoot_closing_hour() -> u32 {
    21
}

fn default_max_page_size() -> u32 {
    100
}

fn default_max_booking_days() -> u32 {
    90
}

impl Default for ClubConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            hold_ttl_minutes: default_hold_ttl_minutes(),
            max_room_occupants: default_max_room_occupants(),
            photoshoot_opening_hour: default_photoshoot_opening_hour(),
            photoshoot_closing_hour: default_photoshoot_closing_hour(),
            max_page_size: default_max_page_size(),
            max_booking_days: default_max_booking_days(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `CLUBDESK__SECTION__KEY`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CLUBDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
