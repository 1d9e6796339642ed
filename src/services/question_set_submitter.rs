//! 题目集合提交服务 - 业务能力层
//!
//! 把题目列表和配图打包成 multipart 请求提交给评分后端

use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::clients::GraderClient;
use crate::error::{AppError, Result};
use crate::models::{ExamMeta, ImageFile, QuestionSet};
use crate::services::diagram_gate::DiagramGate;

/// 题目集合提交服务
///
/// 职责：
/// - 构建 `exam_type` / `subject` / `questions` / `image_<qno>` 表单
/// - 只在闸门打开时提交
/// - 不修改流程状态
pub struct QuestionSetSubmitter {
    client: GraderClient,
}

impl QuestionSetSubmitter {
    pub fn new(client: GraderClient) -> Self {
        Self { client }
    }

    /// 构建提交表单
    ///
    /// 闸门未打开时拒绝构建
    pub fn build_form(
        questions: &QuestionSet,
        gate: &DiagramGate,
        meta: &ExamMeta,
    ) -> Result<Form> {
        meta.validate()?;
        if !gate.is_submission_allowed() {
            return Err(AppError::Validation(format!(
                "Please upload diagrams for all required questions before continuing (missing: {}).",
                join_qnos(&gate.missing())
            )));
        }

        let mut form = Form::new()
            .text("exam_type", meta.exam_type.clone())
            .text("subject", meta.subject.clone())
            .text("questions", questions.to_payload_json()?);

        for (qno, file) in gate.attached() {
            debug!("附加配图 image_{} ({}, {} 字节)", qno, file.file_name, file.len());
            form = form.part(diagram_field_name(qno), image_part(file)?);
        }

        Ok(form)
    }

    /// 提交题目集合
    pub async fn submit(
        &self,
        questions: &QuestionSet,
        gate: &DiagramGate,
        meta: &ExamMeta,
    ) -> Result<()> {
        let form = Self::build_form(questions, gate, meta)?;
        self.send(form, meta, questions.len()).await
    }

    /// 发送已经构建好的表单
    pub async fn send(&self, form: Form, meta: &ExamMeta, question_count: usize) -> Result<()> {
        info!("[试卷 {}] 📤 正在提交 {} 道题到评分后端...", meta, question_count);
        self.client.upload_question_set(form).await?;
        info!("[试卷 {}] ✓ 题目提交成功", meta);
        Ok(())
    }
}

/// 配图字段名
pub fn diagram_field_name(qno: u32) -> String {
    format!("image_{}", qno)
}

pub(crate) fn image_part(file: &ImageFile) -> Result<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime_type)
        .map_err(|e| AppError::Validation(format!("Invalid image type for {}: {}", file.file_name, e)))
}

fn join_qnos(qnos: &[u32]) -> String {
    qnos.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
