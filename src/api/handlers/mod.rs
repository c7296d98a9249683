mod files;
mod health;
mod serve;

pub use files::{file_stats, get_file_by_token, upload_file};
pub use health::health;
pub use serve::serve_file;
