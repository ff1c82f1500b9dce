pub mod filename;
pub mod logging;
pub mod reporter;

pub use filename::{page_file_name, sanitize_filename, score_id_from_url};
pub use reporter::{MemoryReporter, Reporter, TracingReporter};
