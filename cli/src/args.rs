use clap::Parser;
use common::MessageKind;

/// 企业微信群机器人命令行
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wx-robot",
    version,
    about = "Send messages to a WeCom group robot",
    arg_required_else_help = true
)]
pub struct Args {
    /// the key of the robot, falls back to $WX_ROBOT_KEY
    #[arg(short, long)]
    pub key: Option<String>,

    /// the type of the message
    #[arg(short = 't', long, value_enum, default_value_t = MessageKind::Text)]
    pub msg_type: MessageKind,

    /// the list of the mentioned users (userid, or @all)
    #[arg(short = 'm', long)]
    pub mentioned_list: Vec<String>,

    /// the list of the mentioned mobile users
    #[arg(short = 'M', long)]
    pub mentioned_mobile_list: Vec<String>,

    /// message content, a file to read it from, or the media path for image/file/voice
    pub data: String,
}
