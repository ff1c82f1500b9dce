pub mod asset_downloader;
pub mod asset_locator;
pub mod document_assembler;
pub mod manifest_fetcher;
pub mod page_range;
pub mod pdf_engine;

pub use asset_downloader::{AssetDownloader, DownloadRequest, RetryPolicy};
pub use asset_locator::{base_url, locate_assets, parse_manifest};
pub use document_assembler::{select_engine, DocumentAssembler, EngineSelection};
pub use manifest_fetcher::{parse_jsonp, unwrap_jsonp, ManifestFetcher};
pub use page_range::parse_page_range;
pub use pdf_engine::{PageConverter, PdfAccumulator, Svg2PdfConverter};
