use async_trait::async_trait;
use common::{MediaKind, MessageKind, Outcome, Response, RobotCapabilities, RobotError};
use log::*;
use reqwest::{Client, multipart};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::path::Path;
use std::time::Duration;

pub mod media;
pub mod payload;

pub use media::InlineMedia;
pub use payload::Payload;

use payload::MediaBody;

pub const DEFAULT_BASE_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook";
/// 未显式提供 key 时读取的环境变量
pub const KEY_ENV: &str = "WX_ROBOT_KEY";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// 企业微信机器人配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WxWorkConfig {
    pub key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 请求超时（秒），未设置时使用 reqwest 默认值
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl WxWorkConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }

    /// 优先使用显式传入的 key，否则读取 `WX_ROBOT_KEY`
    pub fn from_key_or_env(key: Option<String>) -> Result<Self, RobotError> {
        Self::resolve(key, env::var(KEY_ENV).ok())
    }

    /// 空字符串视为未提供
    pub fn resolve(explicit: Option<String>, fallback: Option<String>) -> Result<Self, RobotError> {
        explicit
            .filter(|k| !k.is_empty())
            .or_else(|| fallback.filter(|k| !k.is_empty()))
            .map(Self::new)
            .ok_or_else(|| {
                RobotError::Config(format!(
                    "robot key is required, pass it explicitly or set {KEY_ENV}"
                ))
            })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    fn send_url(&self) -> String {
        format!("{}/send", self.base_url)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload_media", self.base_url)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// 企业微信群机器人
pub struct WxWorkRobot {
    config: WxWorkConfig,
    http_client: Client,
}

impl WxWorkRobot {
    pub fn new(config: WxWorkConfig) -> Result<Self, RobotError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| RobotError::Config(e.to_string()))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// 上传文件或语音，返回 media_id (三天内有效)
    pub async fn upload_media(&self, path: &Path, kind: MediaKind) -> Result<String, RobotError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| RobotError::io(path, e))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());

        let part = multipart::Part::bytes(data)
            .file_name(filename)
            .mime_str("application/octet-stream")
            .map_err(|e| RobotError::Network(e.to_string()))?;
        let form = multipart::Form::new().part("media", part);

        let response = self
            .http_client
            .post(self.config.upload_url())
            .query(&[("key", self.config.key.as_str()), ("type", kind.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| RobotError::Network(e.to_string()))?;
        let response = read_response(response).await?;

        match response.media_id() {
            Some(media_id) => {
                debug!("uploaded {} as {kind} media {media_id}", path.display());
                Ok(media_id.to_string())
            }
            None => Err(RobotError::Remote {
                code: response.errcode,
                message: response.errmsg,
            }),
        }
    }

    /// 发送任意类型的消息体。服务端返回的错误码不会变成 Err，只记录日志。
    pub async fn dispatch(&self, kind: MessageKind, body: Value) -> Result<Response, RobotError> {
        let payload = Payload::new(kind, body);
        let response = self
            .http_client
            .post(self.config.send_url())
            .query(&[("key", self.config.key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| RobotError::Network(e.to_string()))?;
        let response = read_response(response).await?;

        match response.outcome() {
            Outcome::Success => debug!("sent {kind} message"),
            outcome => error!("failed to send {kind} message: {outcome}"),
        }
        Ok(response)
    }

    async fn send_media(&self, path: &Path, kind: MediaKind) -> Result<Response, RobotError> {
        let media_id = self.upload_media(path, kind).await?;
        let body = serde_json::to_value(MediaBody {
            media_id: &media_id,
        })?;
        let msg_kind = match kind {
            MediaKind::File => MessageKind::File,
            MediaKind::Voice => MessageKind::Voice,
        };
        self.dispatch(msg_kind, body).await
    }
}

async fn read_response(response: reqwest::Response) -> Result<Response, RobotError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| RobotError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(RobotError::Network(format!(
            "Request failed with status: {}, body: {}",
            status, text
        )));
    }
    serde_json::from_str(&text).map_err(|e| RobotError::Decode(format!("{e}: {text}")))
}

#[async_trait]
impl RobotCapabilities for WxWorkRobot {
    async fn send_text(
        &self,
        content: &str,
        mentioned_list: &[String],
        mentioned_mobile_list: &[String],
    ) -> Result<Response, RobotError> {
        let body = payload::text_body(content, mentioned_list, mentioned_mobile_list)?;
        self.dispatch(MessageKind::Text, body).await
    }

    async fn send_markdown(&self, content: &str) -> Result<Response, RobotError> {
        let body = payload::markdown_body(content)?;
        self.dispatch(MessageKind::Markdown, body).await
    }

    async fn send_image(&self, path: &Path) -> Result<Response, RobotError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| RobotError::io(path, e))?;
        let body = serde_json::to_value(media::encode_bytes(&data))?;
        self.dispatch(MessageKind::Image, body).await
    }

    async fn send_file(&self, path: &Path) -> Result<Response, RobotError> {
        self.send_media(path, MediaKind::File).await
    }

    async fn send_voice(&self, path: &Path) -> Result<Response, RobotError> {
        self.send_media(path, MediaKind::Voice).await
    }

    async fn send_news(&self, articles: &Value) -> Result<Response, RobotError> {
        let body = payload::news_body(articles)?;
        self.dispatch(MessageKind::News, body).await
    }

    async fn send_template_card(&self, card: &Value) -> Result<Response, RobotError> {
        self.dispatch(MessageKind::TemplateCard, card.clone()).await
    }
}
