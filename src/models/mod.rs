pub mod evaluation;
pub mod feedback;
pub mod image;
pub mod job;
pub mod loaders;
pub mod question;

pub use evaluation::{EvaluationResult, ForwardedEvaluation, MAX_SCORE_PER_QUESTION};
pub use feedback::{FeedbackEntry, FeedbackResponse, SubjectSummary, SubjectsResponse};
pub use image::ImageFile;
pub use job::{AnswerBatch, InstructorJob};
pub use loaders::load_instructor_job;
pub use question::{ExamMeta, Question, QuestionSet, DIAGRAM_MARKER};
