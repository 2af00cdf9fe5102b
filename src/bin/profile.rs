use algoviz::app::{App, Config};
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let app = App::default();

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(1);

    let config = Config::from_env();
    // Fixed seed so runs can be compared
    let config = Config {
        seed: Some(config.seed.unwrap_or(0)),
        ..config
    };
    app.profile(config, num_iters)
}
