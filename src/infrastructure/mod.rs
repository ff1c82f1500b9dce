pub mod http;
pub mod js_executor;

pub use http::build_client;
pub use js_executor::JsExecutor;
