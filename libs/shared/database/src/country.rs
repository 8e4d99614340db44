use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::CountryIso;

use crate::repository::RepositoryError;

/// One row of a country's relational `appointments` table.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRow {
    pub id: String,
    pub insured_id: String,
    pub schedule_id: i64,
    pub country_iso: CountryIso,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A live connection to one country's relational store.
#[async_trait]
pub trait CountryConnection: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<AppointmentRow>, RepositoryError>;

    async fn insert(&self, row: AppointmentRow) -> Result<(), RepositoryError>;

    async fn update_status(&self, id: &str, status: &str) -> Result<(), RepositoryError>;
}

/// Connection factory for a country's relational store. Processors call
/// `connect` once and cache the handle for the instance lifetime.
#[async_trait]
pub trait CountryDatabase: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn CountryConnection>, RepositoryError>;
}

/// In-memory stand-in for a per-country relational database. Tracks how
/// often `connect` was called so tests can pin the connection-caching
/// behavior of the processors.
#[derive(Debug)]
pub struct InMemoryCountryDatabase {
    country: CountryIso,
    rows: Arc<RwLock<HashMap<String, AppointmentRow>>>,
    connect_count: AtomicUsize,
}

impl InMemoryCountryDatabase {
    pub fn new(country: CountryIso) -> Self {
        Self {
            country,
            rows: Arc::new(RwLock::new(HashMap::new())),
            connect_count: AtomicUsize::new(0),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn row(&self, id: &str) -> Option<AppointmentRow> {
        self.rows.read().await.get(id).cloned()
    }
}

#[async_trait]
impl CountryDatabase for InMemoryCountryDatabase {
    async fn connect(&self) -> Result<Arc<dyn CountryConnection>, RepositoryError> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        debug!("Opening {} relational connection", self.country);
        Ok(Arc::new(InMemoryCountryConnection {
            rows: Arc::clone(&self.rows),
        }))
    }
}

struct InMemoryCountryConnection {
    rows: Arc<RwLock<HashMap<String, AppointmentRow>>>,
}

#[async_trait]
impl CountryConnection for InMemoryCountryConnection {
    async fn find_by_id(&self, id: &str) -> Result<Option<AppointmentRow>, RepositoryError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn insert(&self, row: AppointmentRow) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        rows.insert(row.id.clone(), row);
        Ok(())
    }

    async fn update_status(&self, id: &str, status: &str) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(id) {
            Some(row) => {
                row.status = status.to_string();
                row.updated_at = Utc::now();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(id.to_string())),
        }
    }
}
