//! 分数汇总 - 业务能力层
//!
//! 纯函数：老师端的评分结果和学生端的反馈共用同一套 earned/total/percentage 计算，
//! 只有分档规则不同。

use serde::Serialize;

use crate::models::{EvaluationResult, FeedbackEntry, MAX_SCORE_PER_QUESTION};

/// 一道题的 (得分, 满分)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePair {
    pub score: f64,
    pub total: f64,
}

impl ScorePair {
    pub fn new(score: f64, total: f64) -> Self {
        Self { score, total }
    }
}

impl From<&EvaluationResult> for ScorePair {
    fn from(result: &EvaluationResult) -> Self {
        Self::new(result.score, f64::from(MAX_SCORE_PER_QUESTION))
    }
}

impl From<&FeedbackEntry> for ScorePair {
    fn from(entry: &FeedbackEntry) -> Self {
        Self::new(entry.score(), entry.total())
    }
}

/// 汇总分数，只由结果推导，不存储
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateScore {
    pub earned: f64,
    pub total: f64,
    pub percentage: f64,
}

impl AggregateScore {
    /// 保留一位小数的百分比
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

/// 汇总分数，总分为 0 时百分比为 0
pub fn aggregate<I>(items: I) -> AggregateScore
where
    I: IntoIterator<Item = ScorePair>,
{
    let (earned, total) = items
        .into_iter()
        .fold((0.0, 0.0), |(earned, total), pair| {
            (earned + pair.score, total + pair.total)
        });

    let percentage = if total > 0.0 {
        100.0 * earned / total
    } else {
        0.0
    };

    AggregateScore {
        earned,
        total,
        percentage,
    }
}

/// 老师端评分汇总的分档（4 档）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstructorTier {
    Top,
    Mid,
    Low,
    Bottom,
}

impl InstructorTier {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            InstructorTier::Top
        } else if percentage >= 60.0 {
            InstructorTier::Mid
        } else if percentage >= 40.0 {
            InstructorTier::Low
        } else {
            InstructorTier::Bottom
        }
    }

    /// 进度条颜色
    pub fn color(self) -> &'static str {
        match self {
            InstructorTier::Top => "green",
            InstructorTier::Mid => "blue",
            InstructorTier::Low => "yellow",
            InstructorTier::Bottom => "red",
        }
    }
}

/// 学生端反馈的分档（3 档）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StudentTier {
    Excellent,
    Satisfactory,
    NeedsImprovement,
}

impl StudentTier {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 70.0 {
            StudentTier::Excellent
        } else if percentage >= 40.0 {
            StudentTier::Satisfactory
        } else {
            StudentTier::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StudentTier::Excellent => "Excellent",
            StudentTier::Satisfactory => "Satisfactory",
            StudentTier::NeedsImprovement => "Needs improvement",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            StudentTier::Excellent => "green",
            StudentTier::Satisfactory => "yellow",
            StudentTier::NeedsImprovement => "red",
        }
    }
}

impl std::fmt::Display for StudentTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 单题得分标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuestionMark {
    Full,
    Zero,
    Partial,
}

impl QuestionMark {
    pub fn of(pair: ScorePair) -> Self {
        if pair.score == pair.total {
            QuestionMark::Full
        } else if pair.score == 0.0 {
            QuestionMark::Zero
        } else {
            QuestionMark::Partial
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            QuestionMark::Full => "✔",
            QuestionMark::Zero => "✘",
            QuestionMark::Partial => "●",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_two_questions() {
        let score = aggregate([ScorePair::new(8.0, 10.0), ScorePair::new(6.0, 10.0)]);
        assert_eq!(
            score,
            AggregateScore {
                earned: 14.0,
                total: 20.0,
                percentage: 70.0
            }
        );
        assert_eq!(score.percentage_label(), "70.0%");
    }

    #[test]
    fn test_aggregate_empty_has_zero_percentage() {
        let score = aggregate(std::iter::empty::<ScorePair>());
        assert_eq!(score.earned, 0.0);
        assert_eq!(score.total, 0.0);
        assert_eq!(score.percentage, 0.0);
        assert!(!score.percentage.is_nan());
    }

    #[test]
    fn test_aggregate_zero_totals_has_zero_percentage() {
        let score = aggregate([ScorePair::new(3.0, 0.0)]);
        assert_eq!(score.percentage, 0.0);
    }

    #[test]
    fn test_evaluation_results_use_fixed_total() {
        let results = vec![
            EvaluationResult {
                question: "Q1".to_string(),
                score: 10.0,
                feedback: String::new(),
            },
            EvaluationResult {
                question: "Q2".to_string(),
                score: 5.0,
                feedback: String::new(),
            },
        ];
        let score = aggregate(results.iter().map(ScorePair::from));
        assert_eq!(score.total, 20.0);
        assert_eq!(score.percentage, 75.0);
    }

    #[test]
    fn test_student_tier_boundaries() {
        assert_eq!(StudentTier::from_percentage(70.0), StudentTier::Excellent);
        assert_eq!(StudentTier::from_percentage(69.99), StudentTier::Satisfactory);
        assert_eq!(StudentTier::from_percentage(40.0), StudentTier::Satisfactory);
        assert_eq!(StudentTier::from_percentage(39.9), StudentTier::NeedsImprovement);
        assert_eq!(StudentTier::from_percentage(0.0).label(), "Needs improvement");
    }

    #[test]
    fn test_instructor_tier_boundaries() {
        assert_eq!(InstructorTier::from_percentage(100.0), InstructorTier::Top);
        assert_eq!(InstructorTier::from_percentage(80.0), InstructorTier::Top);
        assert_eq!(InstructorTier::from_percentage(79.9), InstructorTier::Mid);
        assert_eq!(InstructorTier::from_percentage(60.0), InstructorTier::Mid);
        assert_eq!(InstructorTier::from_percentage(40.0), InstructorTier::Low);
        assert_eq!(InstructorTier::from_percentage(39.9), InstructorTier::Bottom);
    }

    #[test]
    fn test_question_mark() {
        assert_eq!(QuestionMark::of(ScorePair::new(10.0, 10.0)), QuestionMark::Full);
        assert_eq!(QuestionMark::of(ScorePair::new(0.0, 10.0)), QuestionMark::Zero);
        assert_eq!(QuestionMark::of(ScorePair::new(4.5, 10.0)), QuestionMark::Partial);
    }
}
