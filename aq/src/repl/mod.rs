//! Interactive session for admitq
//!
//! The same command language drives the interactive prompt and `aq run`
//! scripts.

mod command;
mod session;

pub use command::{COMMAND_HELP, CommandError, SessionCommand};
pub use session::{Flow, Reply, Session, render_patients};

use std::io::BufRead;

use eyre::Result;

use crate::config::Config;
use crate::queue::{AdmissionQueue, SharedQueue};

/// Run the interactive session on a fresh queue
///
/// This is the main entry point for `aq` and `aq repl`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    let queue = AdmissionQueue::new().into_shared();
    let mut session = Session::new(queue, config);
    session.run_interactive().await
}

/// Run a script on a fresh queue, returning the queue for inspection
pub async fn run_script<R: BufRead>(config: &Config, reader: R, quiet: bool) -> Result<SharedQueue> {
    let queue = AdmissionQueue::new().into_shared();
    let mut session = Session::new(queue, config).echo_input(true).quiet(quiet);
    session.run_script(reader).await?;
    Ok(session.queue().clone())
}
