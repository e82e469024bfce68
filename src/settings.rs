use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub admin_token: String,
    pub staff_token: String,
    pub enable_swagger: bool,
    pub enable_cors: bool,
    pub port: u16,
    /// IANA name of the gym's timezone; class times are wall-clock times there.
    pub timezone: String,
    pub gym_title: String,
    pub gym_location: String,
    pub seed_file: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // APP_STAFF_TOKEN -> staff_token
            .add_source(Environment::with_prefix("APP").prefix_separator("_"))
            .set_default("debug", false)?
            .set_default("admin_token", "admin-token-change-me")?
            .set_default("staff_token", "staff-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("enable_cors", false)?
            .set_default("port", 8080)?
            .set_default("timezone", "Europe/Warsaw")?
            .set_default("gym_title", "Gym")?
            .set_default("gym_location", "Gym")?
            .build()?;

        config.try_deserialize()
    }
}
