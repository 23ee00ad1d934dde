use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("route provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("route provider returned status {0}")]
    Status(u16),

    #[error("route provider response had no usable geometry")]
    EmptyGeometry,

    #[error("no routing credentials configured")]
    NoCredentials,
}
