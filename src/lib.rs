pub mod cli;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod runner;
pub mod services;
pub mod session;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    attempt_counter::FileCounterStore, authoring_service::AuthoringService,
    http_store::HttpAssessmentStore,
};

/// Everything a CLI command needs, built once from the configuration.
#[derive(Clone)]
pub struct AppContext {
    pub store: HttpAssessmentStore,
    pub authoring: AuthoringService<HttpAssessmentStore>,
    pub counter: FileCounterStore,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let store = HttpAssessmentStore::from_config(config)?;
        let authoring = AuthoringService::new(store.clone());
        let counter = FileCounterStore::open(&config.attempt_store_path)?;

        Ok(Self {
            store,
            authoring,
            counter,
        })
    }
}
