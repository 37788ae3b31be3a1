use dish_calories::Pipeline;
use dish_calories::config::Config;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // stdout is for the prompt and the answer
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let config = Config::from_env();
    tracing::debug!(?config, "loaded configuration");

    let pipeline = Pipeline::new(&config);
    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout();

    let report = pipeline.run(&mut stdin, &mut stdout).await?;
    println!("{report}");

    Ok(())
}
