use std::time::Duration;

use crate::error::{AppError, Result};

/// 程序配置
///
/// 抽取服务的密钥只从运行环境注入，不在代码里提供默认值
#[derive(Clone, Debug)]
pub struct Config {
    /// 评分后端地址
    pub backend_base_url: String,
    // --- 题目抽取服务（OpenAI 兼容）配置 ---
    pub extraction_api_base_url: String,
    pub extraction_api_key: String,
    pub extraction_model: String,
    /// 单个请求的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 建立连接的超时时间（秒）
    pub connect_timeout_secs: u64,
    /// 阶段交接文件（保存科目和考试类型）
    pub handoff_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "http://127.0.0.1:8000".to_string(),
            extraction_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            extraction_api_key: String::new(),
            extraction_model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
            handoff_file: "stage_handoff.toml".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            backend_base_url: std::env::var("BACKEND_BASE_URL").unwrap_or(default.backend_base_url),
            extraction_api_base_url: std::env::var("EXTRACTION_API_BASE_URL").unwrap_or(default.extraction_api_base_url),
            extraction_api_key: std::env::var("EXTRACTION_API_KEY").unwrap_or(default.extraction_api_key),
            extraction_model: std::env::var("EXTRACTION_MODEL").unwrap_or(default.extraction_model),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            connect_timeout_secs: std::env::var("CONNECT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.connect_timeout_secs),
            handoff_file: std::env::var("HANDOFF_FILE").unwrap_or(default.handoff_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 以指定后端地址构造配置（测试和本地调试用）
    pub fn with_backend(backend_base_url: impl Into<String>) -> Self {
        Self {
            backend_base_url: backend_base_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 抽取服务需要密钥，缺失时直接拒绝
    pub fn require_extraction_key(&self) -> Result<&str> {
        let key = self.extraction_api_key.trim();
        if key.is_empty() {
            return Err(AppError::Config(
                "EXTRACTION_API_KEY is not set; the extraction service needs a server-side credential".to_string(),
            ));
        }
        Ok(key)
    }
}
