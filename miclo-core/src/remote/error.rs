//! Remote data source error types.

/// Failure of a collection fetch. Stores catch and log these; the previous
/// snapshot stays in place.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Request could not be sent or the connection failed
    #[error("HTTP error fetching {endpoint}: {message}")]
    Http { endpoint: String, message: String },
    /// Server answered with a non-success status
    #[error("Server returned status {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },
    /// Body was not a JSON array of records
    #[error("Failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },
    /// A record could not be normalized into its public shape
    #[error("Invalid record from {endpoint}: {message}")]
    Normalize { endpoint: String, message: String },
}

/// Failure of a product submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("HTTP error submitting product: {0}")]
    Http(String),
    #[error("Server rejected product submission with status {0}")]
    Status(u16),
    #[error("Failed to decode submitted product: {0}")]
    Decode(String),
    /// Draft failed validation and was never sent
    #[error("Invalid product: {0}")]
    Invalid(String),
}
