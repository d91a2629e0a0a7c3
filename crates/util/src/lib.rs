pub mod http;
pub mod text_processing;

pub use text_processing::{redact_sensitive, truncate_for_summary};
