pub mod client;
pub mod error;
pub mod metrics;
pub mod transport;

pub use client::{RestStorefrontClient, StorefrontClient};
pub use error::StorefrontApiError;
pub use transport::{HttpExec, ReqwestExecutor};
