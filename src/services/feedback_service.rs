//! 学生反馈服务 - 业务能力层
//!
//! 学生端只读：查询已登记科目，查询某次考试的逐题反馈并汇总分数

use serde::Serialize;
use tracing::{info, warn};

use crate::clients::GraderClient;
use crate::error::{AppError, Result};
use crate::models::{FeedbackEntry, SubjectSummary};
use crate::services::score_aggregator::{aggregate, AggregateScore, ScorePair, StudentTier};

/// 学生某科目某次考试的反馈报告
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub subject: SubjectSummary,
    pub exam_type: String,
    pub feedbacks: Vec<FeedbackEntry>,
    pub score: AggregateScore,
    pub tier: StudentTier,
}

/// 学生反馈服务
pub struct FeedbackReader {
    client: GraderClient,
}

impl FeedbackReader {
    pub fn new(client: GraderClient) -> Self {
        Self { client }
    }

    /// 学生已登记的科目
    pub async fn list_subjects(&self, usn: &str) -> Result<Vec<SubjectSummary>> {
        require_usn(usn)?;
        let subjects = self.client.fetch_subjects(usn).await?;
        info!("[学生 {}] ✓ 已登记 {} 门科目", usn, subjects.len());
        Ok(subjects)
    }

    /// 按名称查找科目
    pub async fn find_subject(&self, usn: &str, subject: &str) -> Result<SubjectSummary> {
        self.list_subjects(usn)
            .await?
            .into_iter()
            .find(|s| s.subject == subject)
            .ok_or_else(|| AppError::Validation("Subject not found".to_string()))
    }

    /// 生成反馈报告
    ///
    /// 未指定考试类型时取该科目的第一个考试类型。
    /// 反馈查询失败时按"暂无反馈"处理，不报错。
    pub async fn load_report(
        &self,
        usn: &str,
        subject: &str,
        exam_type: Option<&str>,
    ) -> Result<FeedbackReport> {
        let summary = self.find_subject(usn, subject).await?;

        let exam_type = match exam_type {
            Some(t) => t.to_string(),
            None => summary.paper_types.first().cloned().ok_or_else(|| {
                AppError::Validation(format!("No exam types available for {}", subject))
            })?,
        };

        let feedbacks = match self.client.fetch_feedback(usn, subject, &exam_type).await {
            Ok(feedbacks) => feedbacks,
            Err(e) => {
                warn!(
                    "[学生 {}] ⚠️ 查询 {} {} 的反馈失败，按暂无反馈处理: {}",
                    usn, subject, exam_type, e
                );
                Vec::new()
            }
        };

        Ok(build_report(summary, exam_type, feedbacks))
    }
}

/// 汇总反馈并分档
pub fn build_report(
    subject: SubjectSummary,
    exam_type: String,
    feedbacks: Vec<FeedbackEntry>,
) -> FeedbackReport {
    let score = aggregate(feedbacks.iter().map(ScorePair::from));
    let tier = StudentTier::from_percentage(score.percentage);
    FeedbackReport {
        subject,
        exam_type,
        feedbacks,
        score,
        tier,
    }
}

fn require_usn(usn: &str) -> Result<()> {
    if usn.trim().is_empty() {
        return Err(AppError::Validation("USN is required".to_string()));
    }
    Ok(())
}
