//! HTTP client for the code-index backend

pub mod index_client;

pub use index_client::{parse_list_response, HttpIndexClient};
