pub mod api;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::api::AppState;
use crate::core::config::AppConfig;
use crate::providers::{ExchangeRateProvider, OpenMeteoProvider, RestCountriesProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve { port: Option<u16> },
}

/// Wires the configured store and providers into the HTTP state.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let store = store::open_store(config)?;
    let client = providers::util::http_client(config.providers.timeout())?;

    let countries =
        RestCountriesProvider::new(&config.providers.restcountries.base_url, client.clone());
    let weather = OpenMeteoProvider::new(
        &config.providers.open_meteo.base_url,
        &config.providers.open_meteo.timezone,
        client.clone(),
    );
    let rates = ExchangeRateProvider::new(&config.providers.currency.base_url, client.clone());

    Ok(AppState::new(
        store,
        Arc::new(countries),
        Arc::new(weather),
        Arc::new(rates),
        client,
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("countrydash starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Serve { port } => cli::serve::serve(&config, port).await,
    }
}
