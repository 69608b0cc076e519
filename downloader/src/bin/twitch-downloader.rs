use twitch_downloader::cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_from_env();
    match run(args).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            std::process::ExitCode::from(twitch_downloader::exit_code(&e))
        }
    }
}

async fn run(args: Args) -> Result<(), anyhow::Error> {
    let config = twitch_downloader::load_config(args.config.as_deref())?;
    let runner = twitch_downloader::SystemRunner;
    let downloader = twitch_downloader::TwitchDownloader::new(
        &config,
        &runner,
        args.video_id.clone(),
        &args.output_dir,
    );
    downloader.run(args.stages()).await
}
