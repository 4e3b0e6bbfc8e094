use crate::args::Args;
use common::{Message, MessageBuilder, MessageKind, RobotError};
use std::fs;
use std::path::{Path, PathBuf};

/// 参数若是已存在的文件，则读取其内容作为消息
fn read_data(data: &str) -> Result<String, RobotError> {
    let path = Path::new(data);
    if path.is_file() {
        fs::read_to_string(path).map_err(|e| RobotError::io(path, e))
    } else {
        Ok(data.to_string())
    }
}

/// 根据命令行参数构造消息，news/template_card 的 JSON 解析失败返回 `RobotError::InvalidJson`
pub fn build_message(args: &Args) -> Result<Message, RobotError> {
    let data = args.data.as_str();
    let message = match args.msg_type {
        MessageKind::Image => Message::Image(PathBuf::from(data)),
        MessageKind::File => Message::File(PathBuf::from(data)),
        MessageKind::Voice => Message::Voice(PathBuf::from(data)),
        MessageKind::Text => MessageBuilder::text(read_data(data)?)
            .mentions(args.mentioned_list.iter().cloned())
            .mention_mobiles(args.mentioned_mobile_list.iter().cloned())
            .build(),
        MessageKind::Markdown => Message::Markdown(read_data(data)?),
        MessageKind::News => Message::News(serde_json::from_str(&read_data(data)?)?),
        MessageKind::TemplateCard => Message::TemplateCard(serde_json::from_str(&read_data(data)?)?),
    };
    Ok(message)
}
