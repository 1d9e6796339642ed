//! 基础设施层（Infrastructure）
//!
//! 持有文件、HTTP 连接等资源，只暴露能力，不认识业务流程

pub mod handoff_store;
pub mod http_client;
pub mod image_encoder;

pub use handoff_store::HandoffStore;
pub use http_client::build_http_client;
pub use image_encoder::ImageEncoder;
