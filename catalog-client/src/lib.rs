pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;

pub use config::{GatewayConfig, API_FUNCTIONS_ROOT, NETLIFY_FUNCTIONS_ROOT};
pub use endpoints::Function;
pub use error::ApiError;
pub use gateway::{interpret, Gateway};
