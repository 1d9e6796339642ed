//! 答题卡评分流程 - 流程层
//!
//! 上传答题卡 → 解包评分 → 汇总分数并分档

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::models::EvaluationResult;
use crate::services::{
    aggregate, AggregateScore, AnswerEvaluator, AnswerSubmission, InstructorTier, ScorePair,
};
use crate::workflow::loading::LoadingFlag;

/// 一次评分的汇总
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub results: Vec<EvaluationResult>,
    pub score: AggregateScore,
    pub tier: InstructorTier,
}

impl EvaluationSummary {
    pub fn from_results(results: Vec<EvaluationResult>) -> Self {
        let score = aggregate(results.iter().map(ScorePair::from));
        let tier = InstructorTier::from_percentage(score.percentage);
        Self {
            results,
            score,
            tier,
        }
    }
}

pub struct EvaluationFlow {
    evaluator: AnswerEvaluator,
    loading: LoadingFlag,
}

impl EvaluationFlow {
    pub fn new(evaluator: AnswerEvaluator) -> Self {
        Self {
            evaluator,
            loading: LoadingFlag::new(),
        }
    }

    /// 评分一名学生的答题卡，请求在途时再次调用返回 `Busy`
    pub async fn run(&self, submission: &AnswerSubmission) -> Result<EvaluationSummary> {
        let _loading = self.loading.try_begin()?;

        let results = self.evaluator.evaluate(submission).await?;
        let summary = EvaluationSummary::from_results(results);

        info!(
            "[答题卡 {} {}] 📊 得分 {}/{} ({})",
            submission.meta,
            submission.usn,
            summary.score.earned,
            summary.score.total,
            summary.score.percentage_label()
        );

        Ok(summary)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }
}
