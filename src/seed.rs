//! Startup data: class templates and clients loaded from a TOML file.
//!
//! ```toml
//! [[classes]]
//! name = "WOD"
//! instructor = "Anna"
//! day_of_week = "Mon"
//! start_time = "18:00:00"
//! end_time = "19:00:00"
//! max_capacity = 12
//! cancel_hours_before = 6
//!
//! [[clients]]
//! name = "Jan"
//! has_active_membership = true
//! ```

use config::{Config, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::booking::BookingManager;
use crate::models::{NewClass, NewClient};
use crate::store::BookingStore;
use crate::validation::{ValidationError, validate_new_class, validate_new_client};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid seed entry: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub classes: Vec<NewClass>,
    #[serde(default)]
    pub clients: Vec<NewClient>,
}

impl Seed {
    pub fn from_file(path: &str) -> Result<Self, SeedError> {
        let config = Config::builder()
            .add_source(File::new(path, FileFormat::Toml))
            .build()?;
        let seed: Seed = config.try_deserialize()?;
        for class in &seed.classes {
            validate_new_class(class)?;
        }
        for client in &seed.clients {
            validate_new_client(client)?;
        }
        Ok(seed)
    }

    pub async fn apply<S: BookingStore>(self, manager: &BookingManager<S>) {
        let (classes, clients) = (self.classes.len(), self.clients.len());
        for class in self.classes {
            manager.create_class(class).await;
        }
        for client in self.clients {
            manager.create_client(client).await;
        }
        info!(classes, clients, "seed data loaded");
    }
}
