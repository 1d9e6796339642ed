//! 流程层（Workflow）
//!
//! 定义出卷和评分两条流程的状态与调度，只依赖业务能力（services）

pub mod evaluation_flow;
pub mod exam_workflow;
pub mod loading;

pub use evaluation_flow::{EvaluationFlow, EvaluationSummary};
pub use exam_workflow::{ExamWorkflow, ExamWorkflowState, ReviewSession};
pub use loading::{LoadingFlag, LoadingGuard};
