pub mod capture;
pub mod headless;

pub use capture::{
    capture_manifest_and_title, clean_title, wait_for_network_idle, CaptureResult, FirstMatch,
    InflightRequests,
};
pub use headless::{launch_browser, BrowserSession};
