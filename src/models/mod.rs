pub mod format;
pub mod manifest;
pub mod output;

pub use format::AssetFormat;
pub use manifest::{AssetLocation, ManifestDocument, PageDescriptor};
pub use output::{DownloadOutcome, DownloadReport, OutputBundle, PageOutcome};
