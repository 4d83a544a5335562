//! Error types shared by the store, the lookup client and the enrichment pipeline.

use thiserror::Error;

use crate::model::Id;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} with id={id} not found")]
    NotFound { entity: &'static str, id: Id },

    /// Unique or foreign-key constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // 23505 unique_violation, 23503 foreign_key_violation
        if let Some(db_err) = err.as_database_error() {
            if matches!(db_err.code().as_deref(), Some("23505") | Some("23503")) {
                return StoreError::ConstraintViolation(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum LookupError {
    /// Connection failure or a non-success HTTP status.
    #[error("failed to request {service} API: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode {service} API response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("country not found for name: {name}")]
    NoCountry { name: String },
}

/// Stage of the person enrichment pipeline, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    GettingAge,
    GettingGender,
    GettingNationality,
    CreatingGender,
    CreatingNationality,
    Creation,
}

impl Stage {
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::GettingAge => "error during getting age",
            Stage::GettingGender => "error during getting gender",
            Stage::GettingNationality => "error during getting nationality",
            Stage::CreatingGender => "error during creating gender",
            Stage::CreatingNationality => "error during creating nationality",
            Stage::Creation => "error during creation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("name is required")]
    MissingName,

    #[error("{stage}: {source}")]
    Lookup {
        stage: Stage,
        #[source]
        source: LookupError,
    },

    #[error("{stage}: {source}")]
    Store {
        stage: Stage,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::MissingName => None,
            PipelineError::Lookup { stage, .. } | PipelineError::Store { stage, .. } => Some(*stage),
        }
    }
}
