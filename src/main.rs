use anyhow::Result;
use clap::Parser;
use scaso_grabber::cli::Cli;
use scaso_grabber::utils::TracingReporter;
use scaso_grabber::{logger, Config, Grabber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    logger::init(&cli.log_level);

    // 加载配置
    let config = Config::from_env();
    let run = cli.into_run_config();

    let reporter = TracingReporter;
    let code = Grabber::new(&config, &run, &reporter)?.run().await;

    std::process::exit(code);
}
