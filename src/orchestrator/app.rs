//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **老师端任务**：读任务文件 → 抽取题目 → 上传配图 → 提交 → （可选）评分答题卡
//! 2. **单独评分**：科目/考试类型缺省时取阶段交接文件里的值
//! 3. **学生端**：查询科目和反馈
//!
//! 各阶段的 `AppError` 在这里转换成面向用户的提示

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{error, info, warn};

use crate::clients::GraderClient;
use crate::config::Config;
use crate::error::{AppError, WorkflowStep};
use crate::infrastructure::{HandoffStore, ImageEncoder};
use crate::models::{load_instructor_job, ExamMeta, QuestionSet, SubjectSummary};
use crate::orchestrator::report;
use crate::services::{
    AnswerEvaluator, AnswerSubmission, ExtractionRequest, FeedbackReader, FeedbackReport,
    LlmService, QuestionExtractor, QuestionSetSubmitter, VisionChat,
};
use crate::utils::logging::log_stage;
use crate::workflow::{EvaluationFlow, EvaluationSummary, ExamWorkflow};

/// 一次老师端任务的结果
#[derive(Debug)]
pub struct JobOutcome {
    pub meta: ExamMeta,
    pub questions: QuestionSet,
    pub evaluation: Option<EvaluationSummary>,
}

/// 应用主结构
pub struct App {
    config: Config,
    client: GraderClient,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = GraderClient::new(&config).context("创建评分后端客户端失败")?;
        Ok(Self { config, client })
    }

    /// 使用指定的评分后端客户端（测试用）
    pub fn with_client(config: Config, client: GraderClient) -> Self {
        Self { config, client }
    }

    pub fn handoff_store(&self) -> HandoffStore {
        HandoffStore::new(&self.config.handoff_file)
    }

    /// 运行老师端任务，使用配置中的抽取服务
    pub async fn run_job(&self, job_path: &Path) -> Result<JobOutcome> {
        let vision = at_step(LlmService::new(&self.config), WorkflowStep::Extraction)?;
        self.run_job_with(vision, job_path).await
    }

    /// 运行老师端任务
    pub async fn run_job_with<V: VisionChat>(&self, vision: V, job_path: &Path) -> Result<JobOutcome> {
        let job = load_instructor_job(job_path).await?;
        let meta = job.meta();

        let workflow = ExamWorkflow::new(
            QuestionExtractor::new(vision),
            QuestionSetSubmitter::new(self.client.clone()),
            self.handoff_store(),
        );

        // ========== ① 抽取题目 ==========
        log_stage(&format!(
            "① 抽取题目 [{}] {}",
            meta,
            job.file_path.as_deref().unwrap_or_default()
        ));
        let paper = at_step(
            ImageEncoder::load(&job.paper_image).await,
            WorkflowStep::Extraction,
        )?;
        let questions = at_step(
            workflow
                .extract(ExtractionRequest::new(paper, job.num_questions, meta.clone()))
                .await,
            WorkflowStep::Extraction,
        )?;
        report::log_questions(&questions);

        // ========== ② 上传配图 ==========
        if !job.diagrams.is_empty() {
            log_stage("② 上传配图");
        }
        for (key, path) in &job.diagrams {
            let qno: u32 = key
                .trim()
                .parse()
                .with_context(|| format!("配图题号不是数字: {}", key))?;
            let file = at_step(ImageEncoder::load(path).await, WorkflowStep::Submission)?;
            at_step(workflow.attach_diagram(qno, file), WorkflowStep::Submission)?;
        }

        let missing = workflow.missing_diagrams();
        if !missing.is_empty() {
            warn!("⚠️ 以下题目仍缺少配图: {:?}", missing);
        }

        // ========== ③ 提交题目 ==========
        log_stage("③ 提交题目");
        let meta = at_step(workflow.submit().await, WorkflowStep::Submission)?;

        // ========== ④ 评分答题卡（可选）==========
        let evaluation = match &job.answers {
            Some(batch) => {
                log_stage(&format!("④ 评分答题卡 [{}]", batch.usn));
                Some(self.evaluate(meta.clone(), &batch.usn, &batch.images).await?)
            }
            None => None,
        };

        let job_file = job
            .file_path
            .clone()
            .unwrap_or_else(|| job_path.display().to_string());
        info!("✅ 任务完成: {}", job_file);

        Ok(JobOutcome {
            meta,
            questions,
            evaluation,
        })
    }

    /// 单独评分，科目/考试类型缺省时取上次提交的值
    pub async fn run_evaluation(
        &self,
        usn: &str,
        images: &[PathBuf],
        subject: Option<String>,
        exam_type: Option<String>,
    ) -> Result<EvaluationSummary> {
        let meta = self.resolve_meta(subject, exam_type).await?;
        log_stage(&format!("评分答题卡 [{} {}]", meta, usn));
        self.evaluate(meta, usn, images).await
    }

    pub async fn run_student_report(
        &self,
        usn: &str,
        subject: &str,
        exam_type: Option<&str>,
    ) -> Result<FeedbackReport> {
        let reader = FeedbackReader::new(self.client.clone());
        let report = at_step(
            reader.load_report(usn, subject, exam_type).await,
            WorkflowStep::Feedback,
        )?;
        report::log_feedback_report(usn, &report);
        Ok(report)
    }

    pub async fn list_subjects(&self, usn: &str) -> Result<Vec<SubjectSummary>> {
        let reader = FeedbackReader::new(self.client.clone());
        let subjects = at_step(reader.list_subjects(usn).await, WorkflowStep::Feedback)?;
        report::log_subjects(usn, &subjects);
        Ok(subjects)
    }

    async fn evaluate(&self, meta: ExamMeta, usn: &str, images: &[PathBuf]) -> Result<EvaluationSummary> {
        let files = at_step(ImageEncoder::load_all(images).await, WorkflowStep::Evaluation)?;
        let submission = AnswerSubmission::new(meta, usn, files);

        let flow = EvaluationFlow::new(AnswerEvaluator::new(self.client.clone()));
        let summary = at_step(flow.run(&submission).await, WorkflowStep::Evaluation)?;
        report::log_evaluation(&summary);
        Ok(summary)
    }

    async fn resolve_meta(&self, subject: Option<String>, exam_type: Option<String>) -> Result<ExamMeta> {
        if let (Some(subject), Some(exam_type)) = (&subject, &exam_type) {
            return Ok(ExamMeta::new(subject.clone(), exam_type.clone()));
        }

        let store = self.handoff_store();
        let saved = store
            .load()
            .await
            .with_context(|| format!("读取阶段交接文件失败: {}", store.path().display()))?;

        match (subject, exam_type, saved) {
            (Some(subject), Some(exam_type), _) => Ok(ExamMeta::new(subject, exam_type)),
            (subject, exam_type, Some(saved)) => Ok(ExamMeta::new(
                subject.unwrap_or(saved.subject),
                exam_type.unwrap_or(saved.exam_type),
            )),
            (_, _, None) => bail!(
                "Subject and exam type are required. Submit a question set first or pass them explicitly."
            ),
        }
    }
}

fn at_step<T>(result: std::result::Result<T, AppError>, step: WorkflowStep) -> Result<T> {
    result.map_err(|e| {
        let message = e.user_message(step);
        error!("❌ {}", message);
        anyhow!(message)
    })
}
