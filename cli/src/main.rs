use crate::args::Args;
use anyhow::Context;
use clap::Parser;
use common::{RobotCapabilities, RobotError};
use log::*;
use std::process;
use wxwork_group_bot::{WxWorkConfig, WxWorkRobot};

mod args;
mod input;

const EXIT_NO_KEY: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));

    let args = Args::parse();

    let config = match WxWorkConfig::from_key_or_env(args.key.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(EXIT_NO_KEY);
        }
    };

    let message = match input::build_message(&args) {
        Ok(message) => message,
        Err(RobotError::InvalidJson(e)) => {
            error!("invalid json format, please check: {e}");
            process::exit(EXIT_INVALID_INPUT);
        }
        Err(e) => return Err(e.into()),
    };

    let kind = message.kind();
    let robot = WxWorkRobot::new(config)?;
    let response = robot
        .send(message)
        .await
        .with_context(|| format!("failed to send {kind} message"))?;
    debug!("response: {response:?}");

    Ok(())
}
