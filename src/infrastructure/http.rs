//! HTTP 客户端 - 基础设施层

use reqwest::Client;

use crate::config::USER_AGENT;

/// 创建带固定 User-Agent 的 HTTP 客户端
///
/// 超时在每个请求上单独设置
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).build()
}
