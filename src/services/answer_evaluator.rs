//! 答题卡评分服务 - 业务能力层
//!
//! 上传 1–5 张答题卡图片，解包后端返回的两层 JSON 得到逐题评分

use reqwest::multipart::Form;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clients::GraderClient;
use crate::error::{AppError, Result};
use crate::models::{
    EvaluationResult, ExamMeta, ForwardedEvaluation, ImageFile, MAX_SCORE_PER_QUESTION,
};
use crate::services::question_set_submitter::image_part;

pub const MIN_ANSWER_IMAGES: usize = 1;
pub const MAX_ANSWER_IMAGES: usize = 5;

/// 外层 JSON 中存放评分结果字符串的键
pub const FORWARDED_RESPONSE_KEY: &str = "forwarded_response";

/// 一名学生的答题卡提交
#[derive(Debug, Clone)]
pub struct AnswerSubmission {
    pub meta: ExamMeta,
    pub usn: String,
    pub images: Vec<ImageFile>,
}

impl AnswerSubmission {
    pub fn new(meta: ExamMeta, usn: impl Into<String>, images: Vec<ImageFile>) -> Self {
        Self {
            meta,
            usn: usn.into(),
            images,
        }
    }

    /// 发请求前的校验：图片数量 1–5，科目/考试类型/USN 非空
    pub fn validate(&self) -> Result<()> {
        if !(MIN_ANSWER_IMAGES..=MAX_ANSWER_IMAGES).contains(&self.images.len()) {
            return Err(AppError::Validation(format!(
                "Please select between {} and {} images.",
                MIN_ANSWER_IMAGES, MAX_ANSWER_IMAGES
            )));
        }
        self.meta.validate()?;
        if self.usn.trim().is_empty() {
            return Err(AppError::Validation("USN is required.".to_string()));
        }
        Ok(())
    }

    /// 构建 multipart 表单
    pub fn build_form(&self) -> Result<Form> {
        let mut form = Form::new()
            .text("subject", self.meta.subject.clone())
            .text("exam_type", self.meta.exam_type.clone())
            .text("total", MAX_SCORE_PER_QUESTION.to_string())
            .text("usn", self.usn.clone());

        for image in &self.images {
            form = form.part("images", image_part(image)?);
        }

        Ok(form)
    }
}

/// 答题卡评分服务
pub struct AnswerEvaluator {
    client: GraderClient,
}

impl AnswerEvaluator {
    pub fn new(client: GraderClient) -> Self {
        Self { client }
    }

    /// 提交答题卡并返回逐题评分（按后端返回顺序）
    ///
    /// 图片数量不合法时不会发出任何请求
    pub async fn evaluate(&self, submission: &AnswerSubmission) -> Result<Vec<EvaluationResult>> {
        submission.validate()?;
        let form = submission.build_form()?;

        info!(
            "[答题卡 {} {}] 📤 上传 {} 张答题卡...",
            submission.meta,
            submission.usn,
            submission.images.len()
        );

        let raw = self.client.evaluate_answers(form).await?;
        let results = decode_evaluation_envelope(raw.content_type.as_deref(), &raw.body)?;

        info!(
            "[答题卡 {} {}] ✓ 收到 {} 道题的评分",
            submission.meta,
            submission.usn,
            results.len()
        );

        Ok(results)
    }
}

/// 解包评分响应
///
/// 外层是 JSON（或纯文本），其中 `forwarded_response` 是一个字符串，
/// 字符串本身再解析为 `{ results: [...] }`。任何一层失败都整体失败。
pub fn decode_evaluation_envelope(
    content_type: Option<&str>,
    body: &str,
) -> Result<Vec<EvaluationResult>> {
    let outer = parse_outer_body(content_type, body).ok_or_else(|| {
        AppError::ResponseFormat("No evaluation results received.".to_string())
    })?;

    let forwarded = match outer.get(FORWARDED_RESPONSE_KEY) {
        Some(Value::String(s)) if !s.is_empty() => s,
        // 空字符串按未收到结果处理
        Some(Value::String(_)) | None => {
            return Err(AppError::ResponseFormat(
                "No evaluation results received.".to_string(),
            ))
        }
        Some(_) => {
            return Err(AppError::ResponseFormat(
                "Invalid server response format.".to_string(),
            ))
        }
    };

    let inner: ForwardedEvaluation = serde_json::from_str(forwarded).map_err(|e| {
        debug!("forwarded_response 解析失败: {}", e);
        AppError::ResponseFormat("Invalid server response format.".to_string())
    })?;

    for (idx, result) in inner.results.iter().enumerate() {
        validate_score(idx + 1, result)?;
    }

    Ok(inner.results)
}

/// 外层只在声明为 JSON 或看起来像 JSON 时解析，纯文本返回 None
fn parse_outer_body(content_type: Option<&str>, body: &str) -> Option<Value> {
    let declared_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => None,
        Err(e) => {
            if declared_json {
                debug!("声明为 JSON 的评分响应无法解析: {}", e);
            }
            None
        }
    }
}

fn validate_score(position: usize, result: &EvaluationResult) -> Result<()> {
    if !result.score.is_finite() || result.score < 0.0 {
        return Err(AppError::ResponseFormat(format!(
            "Invalid server response format: score {} for result {} is not a valid number",
            result.score, position
        )));
    }
    let max = f64::from(MAX_SCORE_PER_QUESTION);
    if result.score > max {
        warn!(
            "第 {} 题得分 {} 超过单题满分 {}，按后端结果保留",
            position, result.score, max
        );
    }
    Ok(())
}
