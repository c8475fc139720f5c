use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("review store unreachable: {0}")]
    Connectivity(#[source] sqlx::Error),

    #[error("aggregation query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DashboardError {
    pub fn missing_var(name: &str) -> Self {
        DashboardError::Configuration(format!("{name} must be set"))
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        DashboardError::Render(err.to_string())
    }
}

impl From<sqlx::Error> for DashboardError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DashboardError::Connectivity(err),
            other => DashboardError::Query(other),
        }
    }
}
