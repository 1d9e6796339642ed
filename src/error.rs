use thiserror::Error;

/// 应用程序错误类型
///
/// 所有错误都在流程步骤的边界被转换成一条面向用户的提示
/// （见 [`AppError::user_message`]），流程状态保持不变
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求没有发出去，或者没有收到响应
    #[error("Network error ({endpoint}): {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 后端返回了非 2xx 状态码
    #[error("Error {status}: {message}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// 抽取结果里找不到合法的 JSON 对象
    #[error("Invalid extraction reply: {0}")]
    ExtractionFormat(String),

    /// 抽取结果解析后没有任何题目
    #[error("No questions extracted")]
    EmptyExtraction,

    /// 评分响应无法按约定的两层结构解析
    #[error("{0}")]
    ResponseFormat(String),

    /// 发起请求前的参数校验失败
    #[error("{0}")]
    Validation(String),

    /// 已有请求在进行中，重复调用直接拒绝
    #[error("A request is already in progress")]
    Busy,

    /// 当前流程状态不允许该操作
    #[error("Operation not allowed in the current state: {0}")]
    InvalidState(String),

    /// 请求完成时流程已被重置，结果被丢弃
    #[error("The workflow was reset while the request was in flight; the response was ignored")]
    Superseded,

    /// 抽取服务（LLM）调用失败
    #[error("Extraction service error (model: {model}): {message}")]
    Llm { model: String, message: String },

    /// 文件读写失败
    #[error("File error ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 序列化失败
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),
}

/// 流程步骤，用于生成面向用户的提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Extraction,
    Submission,
    Evaluation,
    Feedback,
}

impl AppError {
    /// 创建网络请求错误
    pub fn network(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Network {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建文件读取错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 转换成面向用户的一条提示
    pub fn user_message(&self, step: WorkflowStep) -> String {
        match step {
            WorkflowStep::Extraction => format!("Failed to extract questions: {}", self),
            WorkflowStep::Submission => format!("Failed to save questions: {}", self),
            // 校验和格式错误本身就是完整的提示
            WorkflowStep::Evaluation | WorkflowStep::Feedback => match self {
                AppError::Validation(_) | AppError::ResponseFormat(_) | AppError::HttpStatus { .. } => {
                    self.to_string()
                }
                other => format!("Submission error: {}", other),
            },
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;
