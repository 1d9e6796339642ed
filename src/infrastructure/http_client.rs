//! HTTP 客户端 - 基础设施层
//!
//! 所有对外请求共用一套超时设置

use crate::config::Config;
use crate::error::{AppError, Result};

/// 按配置构建 reqwest 客户端
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))
}
