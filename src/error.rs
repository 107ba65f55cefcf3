//! Error types for the query store and the API client
//!
//! This module provides:
//! - `StoreError` for failures while loading query templates
//! - `ClientError` for construction and per-call failures
//! - Stable category labels for logging and diagnostics

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Failures while building a [`crate::QueryStore`].
///
/// Every variant aborts construction; a store is either complete or absent.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query directory could not be listed
    #[error("failed to read query directory {path:?}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single query resource could not be read
    #[error("failed to read query file {file}")]
    FileRead {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// A query resource is not a valid template
    #[error("failed to parse query template {name}")]
    TemplateParse {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// Two resources resolve to the same query name
    #[error("duplicate query name {name}")]
    DuplicateName { name: String },
}

// =============================================================================
// CLIENT ERRORS
// =============================================================================

/// Failures surfaced by [`crate::SpaceXClient`] and the [`crate::SpaceXApi`] trait.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The query store could not be built
    #[error("failed to build query store")]
    Construction(#[from] StoreError),

    /// The HTTP transport could not be configured
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    /// The named query is not in the store
    #[error("query {name} is not in the query store")]
    QueryNotFound { name: String },

    /// Parameter substitution failed
    #[error("template execution failed for query {name}")]
    TemplateRender {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// The GraphQL envelope could not be encoded
    #[error("failed to marshal request body")]
    Serialization(#[source] serde_json::Error),

    /// The POST could not be sent or timed out
    #[error("POST {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be read in full
    #[error("failed to read response body")]
    ResponseRead(#[source] reqwest::Error),
}

impl ClientError {
    /// Stable label used in log fields
    pub fn category(&self) -> &'static str {
        match self {
            ClientError::Construction(_) | ClientError::HttpClient(_) => "construction",
            ClientError::QueryNotFound { .. } => "query_not_found",
            ClientError::TemplateRender { .. } => "template_render",
            ClientError::Serialization(_) => "serialization",
            ClientError::Transport { .. } => "transport",
            ClientError::ResponseRead(_) => "response_read",
        }
    }

    /// True when the client itself could not be built
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ClientError::Construction(_) | ClientError::HttpClient(_)
        )
    }

    /// True when the request deadline elapsed
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Transport { source, .. } | ClientError::ResponseRead(source) => {
                source.is_timeout()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn store_errors_wrap_as_construction() {
        let err: ClientError = StoreError::DuplicateName {
            name: "rockets".to_string(),
        }
        .into();

        assert!(err.is_construction());
        assert_eq!(err.category(), "construction");
        assert!(!err.is_timeout());
        let source = err.source().expect("store error attached");
        assert_eq!(source.to_string(), "duplicate query name rockets");
    }

    #[test]
    fn per_call_categories() {
        let missing = ClientError::QueryNotFound {
            name: "mission_by_id".to_string(),
        };
        assert_eq!(missing.category(), "query_not_found");
        assert!(!missing.is_construction());
        assert_eq!(
            missing.to_string(),
            "query mission_by_id is not in the query store"
        );
    }

    #[test]
    fn template_errors_do_not_repeat_their_source() {
        let source = tera::Tera::one_off("{{ missing }}", &tera::Context::new(), false)
            .expect_err("missing variable");
        let source_text = source.to_string();
        let err = ClientError::TemplateRender {
            name: "rockets".to_string(),
            source,
        };

        assert_eq!(err.to_string(), "template execution failed for query rockets");
        assert_eq!(
            err.source().expect("tera error attached").to_string(),
            source_text
        );

        let parse = StoreError::TemplateParse {
            name: "broken".to_string(),
            source: tera::Error::msg("unexpected token"),
        };
        assert_eq!(parse.to_string(), "failed to parse query template broken");
    }
}
