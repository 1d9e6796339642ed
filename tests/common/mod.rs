#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::Notify;

use paper_grader::models::ExamMeta;
use paper_grader::services::ExtractionRequest;
use paper_grader::{ImageFile, Result, VisionChat};

pub const TWO_QUESTION_REPLY: &str = r#"Here are the questions:
{"1": "Define torque.", "2": "Draw the circuit for a full-wave rectifier (requires diagram)"}"#;

/// 固定回复的抽取服务
pub struct FixedVision(pub &'static str);

impl VisionChat for FixedVision {
    async fn ask_with_image(&self, _system: &str, _user: &str, _image: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// 收到请求后通知 `started`，等到 `release` 再回复
pub struct GatedVision {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
    pub reply: &'static str,
}

impl GatedVision {
    pub fn new(reply: &'static str) -> Self {
        Self {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            reply,
        }
    }
}

impl VisionChat for GatedVision {
    async fn ask_with_image(&self, _system: &str, _user: &str, _image: &str) -> Result<String> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.reply.to_string())
    }
}

pub fn physics() -> ExamMeta {
    ExamMeta::new("Physics", "CIE1")
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(name, b"PNGDATA".to_vec())
}

pub fn extraction_request(num_questions: u32) -> ExtractionRequest {
    ExtractionRequest::new(png("paper.png"), num_questions, physics())
}
