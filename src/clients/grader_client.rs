/// 评分后端客户端
///
/// 封装所有与评分后端（题目入库、答题卡评分、学生反馈）相关的 HTTP 调用
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::infrastructure::build_http_client;
use crate::models::{FeedbackEntry, FeedbackResponse, SubjectSummary, SubjectsResponse};
use reqwest::multipart::Form;
use serde_json::{json, Value};
use tracing::debug;

pub const UPLOAD_QUESTION_SET_PATH: &str = "/upload/upload_qp_json/";
pub const EVALUATE_ANSWERS_PATH: &str = "/imageto/text/";
pub const FEEDBACK_PATH: &str = "/student/feedback/";
pub const SUBJECTS_PATH: &str = "/student/subjects/";

/// 保留原始内容类型和正文，留给调用方自行解包
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub content_type: Option<String>,
    pub body: String,
}

/// 评分后端客户端
#[derive(Clone)]
pub struct GraderClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraderClient {
    /// 创建新的评分后端客户端
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_http(
            build_http_client(config)?,
            config.backend_base_url.clone(),
        ))
    }

    /// 使用已有的 reqwest 客户端
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 提交题目集合
    ///
    /// 非 2xx 时从 JSON 正文的 `error` 字段取提示，取不到则用通用提示
    pub async fn upload_question_set(&self, form: Form) -> Result<()> {
        let url = self.endpoint(UPLOAD_QUESTION_SET_PATH);
        debug!("提交题目集合: {}", url);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::network(UPLOAD_QUESTION_SET_PATH, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = read_body(response, UPLOAD_QUESTION_SET_PATH).await?;
        Err(AppError::HttpStatus {
            endpoint: UPLOAD_QUESTION_SET_PATH.to_string(),
            status: status.as_u16(),
            message: extract_error_message(&body, "Failed to save questions"),
        })
    }

    /// 提交答题卡评分
    ///
    /// 成功时返回原始正文，非 2xx 时把状态码和原始正文放进错误
    pub async fn evaluate_answers(&self, form: Form) -> Result<RawResponse> {
        let url = self.endpoint(EVALUATE_ANSWERS_PATH);
        debug!("提交答题卡评分: {}", url);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::network(EVALUATE_ANSWERS_PATH, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = read_body(response, EVALUATE_ANSWERS_PATH).await?;

        if !status.is_success() {
            return Err(AppError::HttpStatus {
                endpoint: EVALUATE_ANSWERS_PATH.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("评分响应长度: {} 字节", body.len());

        Ok(RawResponse { content_type, body })
    }

    /// 查询学生某科目某次考试的逐题反馈
    pub async fn fetch_feedback(
        &self,
        usn: &str,
        subject: &str,
        exam_type: &str,
    ) -> Result<Vec<FeedbackEntry>> {
        let url = self.endpoint(FEEDBACK_PATH);

        let response = self
            .http
            .get(&url)
            .query(&[("usn", usn), ("subject", subject), ("exam_type", exam_type)])
            .send()
            .await
            .map_err(|e| AppError::network(FEEDBACK_PATH, e))?;

        let parsed: FeedbackResponse =
            parse_json_response(response, FEEDBACK_PATH, "Failed to load feedback").await?;
        Ok(parsed.feedbacks)
    }

    /// 查询学生已登记的科目
    pub async fn fetch_subjects(&self, usn: &str) -> Result<Vec<SubjectSummary>> {
        let url = self.endpoint(SUBJECTS_PATH);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "usn": usn }))
            .send()
            .await
            .map_err(|e| AppError::network(SUBJECTS_PATH, e))?;

        let parsed: SubjectsResponse = parse_json_response(
            response,
            SUBJECTS_PATH,
            "Failed to load subject data. Please try again later.",
        )
        .await?;
        Ok(parsed.subjects_data)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// ========== 辅助函数 ==========

async fn read_body(response: reqwest::Response, endpoint: &str) -> Result<String> {
    response
        .text()
        .await
        .map_err(|e| AppError::network(endpoint, e))
}

async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
    fallback: &str,
) -> Result<T> {
    let status = response.status();
    let body = read_body(response, endpoint).await?;

    if !status.is_success() {
        return Err(AppError::HttpStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: extract_error_message(&body, fallback),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| AppError::ResponseFormat(format!("Invalid server response format: {}", e)))
}

/// 从 `{"error": "..."}` 中提取错误提示
pub fn extract_error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
