use camera_recorder::cli;
use camera_recorder::session::{record, SessionContext};
use clap::Parser;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "camera-recorder")]
#[command(about = "Record a CSI camera to output_<camera_id>.mkv")]
#[command(version)]
struct Cli {
    /// WIDTH HEIGHT FRAMERATE CAMERA_ID, all four or none
    #[arg(
        value_name = "VALUE",
        num_args = 0..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    values: Vec<String>,
}

fn main() -> ExitCode {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=camera_recorder=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let result = cli::run(
        cli.values.as_slice(),
        &mut io::stdout(),
        &mut io::stderr(),
        |params| {
            let ctx = Arc::new(SessionContext::new());
            let handler_ctx = Arc::clone(&ctx);
            if let Err(e) = ctrlc::set_handler(move || handler_ctx.interrupt()) {
                warn!(error = %e, "Failed to install Ctrl-C handler");
            }
            record(params, ctx)
        },
    );

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
