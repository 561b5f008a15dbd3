pub mod api;
pub mod config;
pub mod error;
pub mod external;
pub mod models;
pub mod parser;
pub mod service;

pub use config::AppConfig;
pub use error::ExtractError;
pub use models::{BillItem, DocumentResult, PageResult};
pub use service::ExtractionService;
