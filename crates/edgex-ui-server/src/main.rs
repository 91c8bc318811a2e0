use std::error::Error as _;
use std::io::{self, Write};
use std::process::ExitCode;

use edgex_ui_server::{BootstrapError, LaunchError, run_gateway};

#[tokio::main]
async fn main() -> ExitCode {
    match run_gateway().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(LaunchError::Bootstrap {
            source: BootstrapError::Configuration { source },
        }) => {
            if let Some(error) = command_line(source.as_ref()) {
                error.exit();
            }
            report(LaunchError::Bootstrap {
                source: BootstrapError::Configuration { source },
            })
        }
        Err(error) => report(error),
    }
}

fn report(error: LaunchError) -> ExitCode {
    let report = anyhow::Error::new(error);
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "edgex-ui-server: {report:#}");
    ExitCode::FAILURE
}

/// Finds the clap error behind a configuration failure so `--help`,
/// `--version` and usage errors print the way clap formats them.
fn command_line<'a>(error: &'a (dyn std::error::Error + 'static)) -> Option<&'a clap::Error> {
    let mut current = Some(error);
    while let Some(error) = current {
        if let Some(clap) = error.downcast_ref::<clap::Error>() {
            return Some(clap);
        }
        if let Some(clap) = error.downcast_ref::<Box<clap::Error>>() {
            return Some(clap);
        }
        current = error.source();
    }
    None
}
