pub mod answer_evaluator;
pub mod diagram_gate;
pub mod feedback_service;
pub mod llm_service;
pub mod question_extractor;
pub mod question_set_submitter;
pub mod score_aggregator;

pub use answer_evaluator::{AnswerEvaluator, AnswerSubmission};
pub use diagram_gate::DiagramGate;
pub use feedback_service::{FeedbackReader, FeedbackReport};
pub use llm_service::{LlmService, VisionChat};
pub use question_extractor::{ExtractionRequest, QuestionExtractor};
pub use question_set_submitter::QuestionSetSubmitter;
pub use score_aggregator::{aggregate, AggregateScore, InstructorTier, ScorePair, StudentTier};
