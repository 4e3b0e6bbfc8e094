use common::MessageKind;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// 发送接口的请求体：`{"msgtype": kind, kind: body}`
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub kind: MessageKind,
    pub body: Value,
}

impl Payload {
    pub fn new(kind: MessageKind, body: Value) -> Self {
        Self { kind, body }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("msgtype", self.kind.as_str())?;
        map.serialize_entry(self.kind.as_str(), &self.body)?;
        map.end()
    }
}

// --- WxWork API Body Structs ---

fn is_empty(list: &&[String]) -> bool {
    list.is_empty()
}

#[derive(Serialize)]
struct TextBody<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    mentioned_list: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    mentioned_mobile_list: &'a [String],
}

#[derive(Serialize)]
struct MarkdownBody<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct NewsBody<'a> {
    articles: &'a Value,
}

#[derive(Serialize)]
pub(crate) struct MediaBody<'a> {
    pub media_id: &'a str,
}

pub fn text_body(
    content: &str,
    mentioned_list: &[String],
    mentioned_mobile_list: &[String],
) -> serde_json::Result<Value> {
    serde_json::to_value(TextBody {
        content,
        mentioned_list,
        mentioned_mobile_list,
    })
}

/// 支持的 markdown 子集：标题、加粗、链接、行内代码、引用，
/// 以及 `<font color="info|comment|warning">` 三种内置颜色。
pub fn markdown_body(content: &str) -> serde_json::Result<Value> {
    serde_json::to_value(MarkdownBody { content })
}

/// articles 原样放入消息体，字段由服务端校验
pub fn news_body(articles: &Value) -> serde_json::Result<Value> {
    serde_json::to_value(NewsBody { articles })
}
