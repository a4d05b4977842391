use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransitError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("The name {0} cannot be matched to a known object")]
    NotFound(String),

    #[error("Catalog query failed ({reason}); the query sent was: {query}")]
    CatalogQuery { query: String, reason: String },

    #[error("Could not assemble a complete ephemeris (period and transit epoch)")]
    IncompleteEphemeris,

    #[error("No visible transit found up to the year {0}; stopping the search")]
    VisibilitySearchExhausted(f64),

    #[error("Visibility search cancelled")]
    SearchCancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Time error: {0}")]
    Time(#[from] hifitime::HifitimeError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl TransitError {
    /// Wrap a transport or parsing failure together with the query that triggered it.
    pub(crate) fn catalog(query: impl Into<String>, reason: impl ToString) -> Self {
        TransitError::CatalogQuery {
            query: query.into(),
            reason: reason.to_string(),
        }
    }
}

impl PartialEq for TransitError {
    fn eq(&self, other: &Self) -> bool {
        use TransitError::*;
        match (self, other) {
            (InvalidArgument(a), InvalidArgument(b)) => a == b,
            (NotFound(a), NotFound(b)) => a == b,
            (
                CatalogQuery {
                    query: qa,
                    reason: ra,
                },
                CatalogQuery {
                    query: qb,
                    reason: rb,
                },
            ) => qa == qb && ra == rb,
            (VisibilitySearchExhausted(a), VisibilitySearchExhausted(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (InvalidUrl(a), InvalidUrl(b)) => a == b,

            // Not comparable: same variant is enough
            (Time(_), Time(_)) => true,
            (TomlError(_), TomlError(_)) => true,

            (IncompleteEphemeris, IncompleteEphemeris) => true,
            (SearchCancelled, SearchCancelled) => true,

            _ => false,
        }
    }
}
