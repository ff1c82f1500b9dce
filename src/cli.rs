//! 命令行参数

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{RunConfig, DEFAULT_RETRIES, DEFAULT_THROTTLE_MS, PDF_ENGINES};
use crate::models::AssetFormat;

/// Download a MuseScore score as SVG pages, MusicXML, MIDI and a combined PDF
#[derive(Debug, Parser)]
#[command(name = "scaso_grabber", version)]
pub struct Cli {
    /// Score page URL
    pub url: String,

    /// Output directory (default: scores/musescore_<title - id>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not combine SVG pages into a PDF
    #[arg(long)]
    pub no_pdf: bool,

    /// PDF combine engine
    #[arg(long, default_value = PDF_ENGINES[0])]
    pub pdf_engine: String,

    /// Comma-separated formats to download: svg, mxl, mid
    #[arg(long, default_value = "svg,mxl,mid", value_parser = parse_formats)]
    pub formats: FormatList,

    /// 1-based pages to download, e.g. "1-3,5"
    #[arg(long)]
    pub page_range: Option<String>,

    /// Retries per asset after the first attempt
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Pause after each saved asset, in milliseconds
    #[arg(long, default_value_t = DEFAULT_THROTTLE_MS)]
    pub throttle: u64,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// 已校验、去重的格式列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatList(pub Vec<AssetFormat>);

fn parse_formats(value: &str) -> Result<FormatList, String> {
    AssetFormat::parse_list(value)
        .map(FormatList)
        .map_err(|item| format!("unsupported format: {} (expected svg, mxl, mid)", item))
}

impl Cli {
    pub fn into_run_config(self) -> RunConfig {
        RunConfig {
            url: self.url,
            output_dir: self.output,
            no_pdf: self.no_pdf,
            pdf_engine: self.pdf_engine,
            formats: self.formats.0,
            page_range: self.page_range,
            retries: self.retries,
            throttle: Duration::from_millis(self.throttle),
            headful: self.headful,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["scaso_grabber", "https://musescore.com/user/1/scores/42"])
            .unwrap();
        assert_eq!(cli.log_level, "info");

        let run = cli.into_run_config();
        assert_eq!(run, RunConfig::new("https://musescore.com/user/1/scores/42"));
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "scaso_grabber",
            "https://musescore.com/user/1/scores/42",
            "-o",
            "out",
            "--no-pdf",
            "--pdf-engine",
            "none",
            "--formats",
            " MIDI, svg,,svg ",
            "--page-range",
            "1-3",
            "--retries",
            "5",
            "--throttle",
            "0",
            "--headful",
        ])
        .unwrap();

        let run = cli.into_run_config();
        assert_eq!(run.output_dir, Some(PathBuf::from("out")));
        assert!(run.no_pdf);
        assert_eq!(run.pdf_engine, "none");
        assert_eq!(run.formats, vec![AssetFormat::Midi, AssetFormat::Svg]);
        assert_eq!(run.page_range.as_deref(), Some("1-3"));
        assert_eq!(run.retries, 5);
        assert_eq!(run.throttle, Duration::ZERO);
        assert!(run.headful);
    }

    #[test]
    fn test_unsupported_format_is_usage_error() {
        let err = Cli::try_parse_from([
            "scaso_grabber",
            "https://musescore.com/user/1/scores/42",
            "--formats",
            "svg,pdf",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("pdf"));
    }
}
