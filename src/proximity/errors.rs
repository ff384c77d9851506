use crate::models::RegionId;

// ============================================================================
// Proximity Query Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Region not found: {0}")]
    NotFound(RegionId),

    #[error("Reference region could not be resolved: {0}")]
    ReferenceNotFound(RegionId),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    /// Whether a caller may reasonably retry the same request.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueryError::StoreUnavailable(_))
    }

    /// Stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::InvalidArgument(_) => "invalid_argument",
            QueryError::NotFound(_) => "not_found",
            QueryError::ReferenceNotFound(_) => "reference_not_found",
            QueryError::StoreUnavailable(_) => "store_unavailable",
            QueryError::Query(_) => "query",
            QueryError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => QueryError::StoreUnavailable(err),
            other => QueryError::Query(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_errors_are_store_unavailable() {
        let err: QueryError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, QueryError::StoreUnavailable(_)));
        assert!(err.is_transient());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: QueryError = sqlx::Error::Io(io).into();
        assert_eq!(err.kind(), "store_unavailable");
    }

    #[test]
    fn test_malformed_queries_are_query_errors() {
        let err: QueryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, QueryError::Query(_)));
        assert!(!err.is_transient());

        let err: QueryError = sqlx::Error::ColumnNotFound("distance".to_string()).into();
        assert_eq!(err.kind(), "query");
    }
}
