//! Run command implementation

use crate::config::Config;
use crate::dashboard::Dashboard;
use clap::Args;
use std::io::{IsTerminal, Write};
use std::time::Duration;

/// Clear screen and move the cursor home
const CLEAR: &str = "\x1b[2J\x1b[H";

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Exit after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut dashboard = Dashboard::from_config(config)?;
        dashboard.start();

        let redraw = std::io::stdout().is_terminal();
        let deadline = async {
            match self.duration_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let result = loop {
            draw(&dashboard.render(), redraw)?;

            tokio::select! {
                _ = dashboard.changed() => {}
                signal = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, shutting down");
                    break signal.map_err(anyhow::Error::from);
                }
                _ = &mut deadline => {
                    tracing::info!("Run duration elapsed");
                    break Ok(());
                }
            }
        };

        dashboard.stop();
        result
    }
}

fn draw(frame: &str, redraw: bool) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    if redraw {
        write!(stdout, "{}", CLEAR)?;
    }
    writeln!(stdout, "{}\n", frame)?;
    stdout.flush()
}
