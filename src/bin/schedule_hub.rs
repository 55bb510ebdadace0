use lib::hub::{api::ApiClient, models, run_tool, session::FileSession};

use std::{io, process::ExitCode, time::Duration};

use clap::Parser;
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::{debug, info};
use models::{Args, Config};

#[tokio::main]
async fn main() -> ExitCode {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let config: Config = match Figment::new()
        .merge(Json::file(&args.config_json_path))
        .merge(Env::prefixed("HUB_"))
        .extract()
    {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    info!("Using backend at {}", config.api_base_url);
    let http_client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Could not set up HTTP client: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let api = ApiClient::new(
        http_client,
        FileSession::new(args.session_json_path.clone()),
        config.api_base_url,
    );

    /* Do what was asked */
    match run_tool::run(&api, &args, &mut io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{:?}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
