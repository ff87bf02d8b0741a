use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::config::FoursquareConfig;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub http: reqwest::Client,
    pub foursquare: Arc<FoursquareConfig>,
    pub password_cost: u32,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        foursquare: FoursquareConfig,
        password_cost: u32,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        Ok(Self {
            pool,
            http,
            foursquare: Arc::new(foursquare),
            password_cost,
        })
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
