//! LLM 服务 - 业务能力层
//!
//! 只负责"带图片的一问一答"能力，不关心题目怎么解析
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Groq, Azure, Gemini 等）

use std::future::Future;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};

/// 视觉问答能力
///
/// 题目抽取只依赖这个接口，测试里可以换成假的实现
pub trait VisionChat {
    /// 发送系统提示 + 用户文本 + 一张图片（data URL），返回回复文本
    fn ask_with_image(
        &self,
        system_message: &str,
        user_message: &str,
        image_data_url: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// LLM 服务
///
/// 职责：
/// - 调用 OpenAI 兼容的 chat/completions 接口
/// - 密钥来自运行环境的配置，不写死在代码里
/// - 不解析回复内容
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务，缺少密钥时报配置错误
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_extraction_key()?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.extraction_api_base_url);

        let client = Client::with_config(openai_config);

        Ok(Self {
            client,
            model_name: config.extraction_model.clone(),
            temperature: 0.1,
            max_tokens: 4000,
            timeout: config.request_timeout(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 发送系统提示 + 文本 + 一张图片
    ///
    /// # 参数
    /// - `system_message`: 系统消息
    /// - `user_message`: 用户消息内容
    /// - `image_url`: 图片 URL（可以是 data URL），追加在用户消息之后
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        system_message: &str,
        user_message: &str,
        image_url: &str,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let messages = self.build_messages(system_message, user_message, image_url)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| self.llm_error(e))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!("LLM API 调用超时 ({:?})", self.timeout);
                self.llm_error(format!("request timed out after {:?}", self.timeout))
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                self.llm_error(e)
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Llm {
                model: self.model_name.clone(),
                message: "empty reply".to_string(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 系统消息 + 带一张图片的用户消息
    fn build_messages(
        &self,
        system_message: &str,
        user_message: &str,
        image_url: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| self.llm_error(e))?;

        // Vision API：文本 + 图片
        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: user_message.to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image_url.to_string(),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| self.llm_error(e))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];
        Ok(messages)
    }

    fn llm_error(&self, err: impl std::fmt::Display) -> AppError {
        AppError::Llm {
            model: self.model_name.clone(),
            message: err.to_string(),
        }
    }
}

impl VisionChat for LlmService {
    async fn ask_with_image(
        &self,
        system_message: &str,
        user_message: &str,
        image_data_url: &str,
    ) -> Result<String> {
        self.send_to_llm(system_message, user_message, image_data_url)
            .await
    }
}
