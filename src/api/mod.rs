mod client;
mod types;

pub use client::ApiClient;
pub use types::{DatabaseConfig, HealthReply, StatusReply, TablesReply, UploadReply};
