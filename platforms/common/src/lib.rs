use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// 机器人错误类型
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Remote error: code={code}, message={message}")]
    Remote { code: i64, message: String },
}

impl RobotError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        RobotError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// 消息类型 (msgtype)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Markdown,
    Image,
    News,
    File,
    Voice,
    #[cfg_attr(feature = "clap", value(name = "template_card"))]
    TemplateCard,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::Text,
        MessageKind::Markdown,
        MessageKind::Image,
        MessageKind::News,
        MessageKind::File,
        MessageKind::Voice,
        MessageKind::TemplateCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Markdown => "markdown",
            MessageKind::Image => "image",
            MessageKind::News => "news",
            MessageKind::File => "file",
            MessageKind::Voice => "voice",
            MessageKind::TemplateCard => "template_card",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 上传素材类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    File,
    Voice,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::File => "file",
            MediaKind::Voice => "voice",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 图文消息中的一篇文章，供库调用方类型化地构造 news 消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picurl: Option<String>,
}

/// 待发送的消息
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// 纯文本消息，可 @ 成员
    Text {
        content: String,
        mentioned_list: Vec<String>,
        mentioned_mobile_list: Vec<String>,
    },
    /// Markdown格式消息
    Markdown(String),
    /// 图片消息 (本地路径)
    Image(PathBuf),
    /// 文件消息 (本地路径，发送前上传)
    File(PathBuf),
    /// 语音消息 (本地路径，发送前上传)
    Voice(PathBuf),
    /// 图文消息，articles 数组原样透传
    News(Value),
    /// 模板卡片，原样透传
    TemplateCard(Value),
}

impl Message {
    /// 由类型化的文章列表构造图文消息
    pub fn news(articles: &[Article]) -> serde_json::Result<Message> {
        Ok(Message::News(serde_json::to_value(articles)?))
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Text { .. } => MessageKind::Text,
            Message::Markdown(_) => MessageKind::Markdown,
            Message::Image(_) => MessageKind::Image,
            Message::File(_) => MessageKind::File,
            Message::Voice(_) => MessageKind::Voice,
            Message::News(_) => MessageKind::News,
            Message::TemplateCard(_) => MessageKind::TemplateCard,
        }
    }
}

/// 文本消息构建器
pub struct MessageBuilder {
    content: String,
    mentioned_list: Vec<String>,
    mentioned_mobile_list: Vec<String>,
}

impl MessageBuilder {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mentioned_list: Vec::new(),
            mentioned_mobile_list: Vec::new(),
        }
    }

    /// 添加@提及 (userid，"@all" 表示所有人)
    pub fn mention(mut self, user: impl Into<String>) -> Self {
        self.mentioned_list.push(user.into());
        self
    }

    /// 添加多个@提及
    pub fn mentions(mut self, users: impl IntoIterator<Item = String>) -> Self {
        self.mentioned_list.extend(users);
        self
    }

    /// 按手机号@提及
    pub fn mention_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mentioned_mobile_list.push(mobile.into());
        self
    }

    pub fn mention_mobiles(mut self, mobiles: impl IntoIterator<Item = String>) -> Self {
        self.mentioned_mobile_list.extend(mobiles);
        self
    }

    pub fn build(self) -> Message {
        Message::Text {
            content: self.content,
            mentioned_list: self.mentioned_list,
            mentioned_mobile_list: self.mentioned_mobile_list,
        }
    }
}

pub const ERRCODE_OK: i64 = 0;
pub const ERRCODE_INVALID_KEY: i64 = 93000;
pub const ERRCODE_RATE_LIMITED: i64 = 45033;

/// 接口响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    /// 其余字段 (如 media_id)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.errcode == ERRCODE_OK
    }

    pub fn outcome(&self) -> Outcome {
        match self.errcode {
            ERRCODE_OK => Outcome::Success,
            ERRCODE_INVALID_KEY => Outcome::InvalidKey,
            ERRCODE_RATE_LIMITED => Outcome::RateLimited,
            code => Outcome::Failed {
                code,
                message: self.errmsg.clone(),
            },
        }
    }

    pub fn media_id(&self) -> Option<&str> {
        self.extra.get("media_id").and_then(Value::as_str)
    }
}

/// 响应结果分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// key 不合法或机器人已被移出群
    InvalidKey,
    /// 接口并发调用超过限制
    RateLimited,
    /// 其他错误，message 为服务端返回的 errmsg
    Failed { code: i64, message: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("ok"),
            Outcome::InvalidKey => {
                f.write_str("robot key is invalid or the robot has been removed from the group")
            }
            Outcome::RateLimited => f.write_str("API concurrency limit exceeded"),
            Outcome::Failed { message, .. } => f.write_str(message),
        }
    }
}

/// 机器人能力trait（用于dyn兼容）
#[async_trait]
pub trait RobotCapabilities: Send + Sync {
    /// 发送纯文本消息，空的提及列表不会出现在消息体中
    async fn send_text(
        &self,
        content: &str,
        mentioned_list: &[String],
        mentioned_mobile_list: &[String],
    ) -> Result<Response, RobotError>;

    /// 发送Markdown消息
    async fn send_markdown(&self, content: &str) -> Result<Response, RobotError>;

    /// 发送图片消息 (内联 base64 + md5)
    async fn send_image(&self, path: &Path) -> Result<Response, RobotError>;

    /// 上传后发送文件消息
    async fn send_file(&self, path: &Path) -> Result<Response, RobotError>;

    /// 上传后发送语音消息
    async fn send_voice(&self, path: &Path) -> Result<Response, RobotError>;

    /// 发送图文消息，articles 不做校验
    async fn send_news(&self, articles: &Value) -> Result<Response, RobotError>;

    /// 发送模板卡片消息
    async fn send_template_card(&self, card: &Value) -> Result<Response, RobotError>;

    /// 通用发送方法
    async fn send(&self, message: Message) -> Result<Response, RobotError> {
        match message {
            Message::Text {
                content,
                mentioned_list,
                mentioned_mobile_list,
            } => {
                self.send_text(&content, &mentioned_list, &mentioned_mobile_list)
                    .await
            }
            Message::Markdown(content) => self.send_markdown(&content).await,
            Message::Image(path) => self.send_image(&path).await,
            Message::File(path) => self.send_file(&path).await,
            Message::Voice(path) => self.send_voice(&path).await,
            Message::News(articles) => self.send_news(&articles).await,
            Message::TemplateCard(card) => self.send_template_card(&card).await,
        }
    }
}
