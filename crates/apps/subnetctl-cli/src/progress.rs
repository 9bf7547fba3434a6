//! Progress spinners for commands that wait on the network.

use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::output::OutputFormat;

/// Create a spinner with a message.
///
/// Hidden when the output is JSON or stderr is not a terminal, so scripted
/// runs see only the rendered result.
pub fn spinner(msg: &str, format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run an async operation with a spinner, clearing it on completion.
pub async fn with_spinner<F, T>(msg: &str, format: OutputFormat, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = spinner(msg, format);
    let result = fut.await;
    pb.finish_and_clear();
    result
}
