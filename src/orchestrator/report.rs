//! 结果输出 - 编排层
//!
//! 只负责把各阶段结果写进日志，不做判断

use tracing::info;

use crate::models::{QuestionSet, SubjectSummary};
use crate::services::score_aggregator::QuestionMark;
use crate::services::{FeedbackReport, ScorePair};
use crate::utils::logging::truncate_text;
use crate::workflow::EvaluationSummary;

pub fn log_questions(questions: &QuestionSet) {
    info!("📋 共 {} 道题:", questions.len());
    for q in questions.iter() {
        let flag = if q.requires_diagram { " [需要配图]" } else { "" };
        info!("  {}. {}{}", q.qno, truncate_text(&q.text, 80), flag);
    }
}

pub fn log_evaluation(summary: &EvaluationSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评分结果");
    info!("{}", "=".repeat(60));
    for (idx, result) in summary.results.iter().enumerate() {
        let mark = QuestionMark::of(ScorePair::from(result));
        info!(
            "{} Q{} ({}/10) {}",
            mark.symbol(),
            idx + 1,
            result.score,
            truncate_text(&result.question, 60)
        );
        if !result.feedback.is_empty() {
            info!("    💬 {}", result.feedback);
        }
    }
    info!("{}", "─".repeat(60));
    info!(
        "总分: {}/{} ({}) [{}]",
        summary.score.earned,
        summary.score.total,
        summary.score.percentage_label(),
        summary.tier.color()
    );
    info!("{}", "=".repeat(60));
}

pub fn log_feedback_report(usn: &str, report: &FeedbackReport) {
    info!("\n{}", "=".repeat(60));
    info!(
        "🎓 {} - {} (第 {} 学期) {}",
        usn, report.subject.subject, report.subject.sem, report.exam_type
    );
    info!("{}", "=".repeat(60));

    if report.feedbacks.is_empty() {
        info!("暂无反馈");
    }
    for entry in &report.feedbacks {
        let mark = QuestionMark::of(ScorePair::from(entry));
        info!(
            "{} Q{} ({}/{}) {}",
            mark.symbol(),
            entry.qno,
            entry.score(),
            entry.total(),
            truncate_text(&entry.question, 60)
        );
        if !entry.feedback.is_empty() {
            info!("    💬 {}", entry.feedback);
        }
    }

    info!("{}", "─".repeat(60));
    info!(
        "总分: {}/{} ({}) {} [{}]",
        report.score.earned,
        report.score.total,
        report.score.percentage_label(),
        report.tier,
        report.tier.color()
    );
    info!("{}", "=".repeat(60));
}

pub fn log_subjects(usn: &str, subjects: &[SubjectSummary]) {
    info!("📚 {} 已登记 {} 门科目", usn, subjects.len());
    for s in subjects {
        info!("  • {} (第 {} 学期): {}", s.subject, s.sem, s.paper_types.join(", "));
    }
}
