use anyhow::Context;
use pr_comment_resource::{
    Command, check_repository, parse_args, read_check_request, write_check_response,
};
use tracing::info;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            // Stdout belongs to the resource protocol.
            eprint!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let command = match parse_args(std::env::args_os()) {
        Ok(command) => command,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    match command {
        Command::Check => {
            let request = read_check_request(std::io::stdin().lock())?;
            let versions = check_repository(&request)
                .await
                .with_context(|| format!("Check of {} failed", request.source.repository))?;
            info!(count = versions.len(), "emitting versions");
            write_check_response(&versions, &mut std::io::stdout().lock())?;
        }
    }

    Ok(())
}
