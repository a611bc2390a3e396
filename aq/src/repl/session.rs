//! Session management: command dispatch for the prompt and for scripts

use std::fmt;
use std::future::Future;
use std::io::{self, BufRead};
use std::sync::Arc;

use colored::Colorize;
use eyre::{Context, Result, eyre};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::command::{COMMAND_HELP, SessionCommand};
use crate::config::{Config, ReplConfig};
use crate::domain::{Patient, PriorityClass, UpdatePatient};
use crate::queue::{AdmissionStats, ClassCounts, QUEUE_SEPARATOR, QueueError, SharedQueue};
use crate::service::{AutoService, ServiceConfig, ServiceEvent, ServiceSummary};

/// Whether the session keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Result of executing one command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Admitted {
        name: String,
    },
    Served(Patient),
    Updated {
        name: String,
    },
    /// Rendered queue; empty when there is nobody waiting
    Queue(String),
    Stats {
        stats: AdmissionStats,
        counts: ClassCounts,
        next_to_serve: PriorityClass,
    },
    AutoStopped(ServiceSummary),
    Help,
    Quit,
    Failed(QueueError),
}

impl Reply {
    pub fn flow(&self) -> Flow {
        match self {
            Reply::Quit => Flow::Quit,
            _ => Flow::Continue,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Admitted { name } => write!(f, "Patient {} added.", name),
            Reply::Served(patient) => write!(f, "Serving patient: {}", patient),
            Reply::Updated { name } => write!(f, "Patient {} updated.", name),
            Reply::Queue(rendered) if rendered.is_empty() => write!(f, "Queue is empty."),
            Reply::Queue(rendered) => write!(f, "Queue: {}", rendered),
            Reply::Stats {
                stats,
                counts,
                next_to_serve,
            } => {
                writeln!(
                    f,
                    "Waiting: {} ({} elevated, {} normal)",
                    counts.total(),
                    counts.elevated,
                    counts.normal
                )?;
                writeln!(
                    f,
                    "Next class due: {} ({})",
                    next_to_serve,
                    if counts.alternation_applies() {
                        "alternating"
                    } else {
                        "elevated first"
                    }
                )?;
                writeln!(
                    f,
                    "Admitted: {}  Served: {} ({} elevated, {} normal)  Updated: {}",
                    stats.total_admitted,
                    stats.total_served(),
                    stats.total_served_elevated,
                    stats.total_served_normal,
                    stats.total_updated
                )?;
                write!(
                    f,
                    "Empty dequeues: {}  No eligible patient: {}",
                    stats.total_empty, stats.total_no_eligible
                )
            }
            Reply::AutoStopped(summary) => write!(
                f,
                "Automatic service stopped after {} rounds ({} served).",
                summary.ticks, summary.served
            ),
            Reply::Help => {
                writeln!(f, "Available Commands:")?;
                for (i, (usage, description)) in COMMAND_HELP.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "  {:26} {}", usage, description)?;
                }
                Ok(())
            }
            Reply::Quit => Ok(()),
            Reply::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// Command session over a shared queue
pub struct Session {
    queue: SharedQueue,
    service: ServiceConfig,
    repl: ReplConfig,
    echo_input: bool,
    print_replies: bool,
}

impl Session {
    /// Create a new session
    pub fn new(queue: SharedQueue, config: &Config) -> Self {
        debug!("Session::new: called");
        Self {
            queue,
            service: config.service.clone(),
            repl: config.repl.clone(),
            echo_input: false,
            print_replies: true,
        }
    }

    /// Print each command before its reply (script mode)
    pub fn echo_input(mut self, echo: bool) -> Self {
        self.echo_input = echo;
        self
    }

    /// Suppress replies on stdout; parse errors still go to stderr
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.print_replies = !quiet;
        self
    }

    pub fn queue(&self) -> &SharedQueue {
        &self.queue
    }

    /// Execute a parsed command against the queue
    pub async fn execute(&mut self, command: SessionCommand) -> Result<Reply> {
        debug!(?command, "Session::execute: called");
        let reply = match command {
            SessionCommand::Add {
                name,
                age,
                priority_class,
            } => {
                let mut queue = self.queue.lock().await;
                match queue.enqueue(name.as_str(), age, priority_class) {
                    Ok(()) => Reply::Admitted { name },
                    Err(e) => Reply::Failed(e),
                }
            }
            SessionCommand::Serve => {
                let mut queue = self.queue.lock().await;
                match queue.dequeue() {
                    Ok(patient) => Reply::Served(patient),
                    Err(e) => Reply::Failed(e),
                }
            }
            SessionCommand::Edit {
                name,
                age,
                priority_class,
            } => {
                let changes = UpdatePatient::default().age(age).priority_class(priority_class);
                self.update(name, changes).await
            }
            SessionCommand::Rename { name, new_name } => {
                let changes = UpdatePatient::default().name(new_name);
                self.update(name, changes).await
            }
            SessionCommand::Queue => {
                let queue = self.queue.lock().await;
                Reply::Queue(queue.view().to_string())
            }
            SessionCommand::Stats => {
                let queue = self.queue.lock().await;
                Reply::Stats {
                    stats: queue.stats(),
                    counts: queue.counts(),
                    next_to_serve: queue.next_to_serve(),
                }
            }
            SessionCommand::Auto { ticks } => Reply::AutoStopped(self.run_auto(ticks).await?),
            SessionCommand::Help => Reply::Help,
            SessionCommand::Quit => Reply::Quit,
        };
        Ok(reply)
    }

    async fn update(&self, name: String, changes: UpdatePatient) -> Reply {
        let mut queue = self.queue.lock().await;
        match queue.update(&name, changes) {
            Ok(()) => Reply::Updated { name },
            Err(e) => Reply::Failed(e),
        }
    }

    /// Parse and execute one input line, printing the outcome
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = match SessionCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                debug!(%line, error = %e, "Session::handle_line: parse error");
                eprintln!("{} {}", "?".yellow(), e);
                eprintln!("Type {} for available commands", "help".yellow());
                return Ok(Flow::Continue);
            }
        };

        if self.echo_input && self.print_replies {
            println!("{} {}", self.repl.prompt.dimmed(), line.trim());
        }

        let reply = self.execute(command).await?;
        if self.print_replies {
            print_reply(&reply);
        }
        Ok(reply.flow())
    }

    /// Run the interactive prompt until `quit` or end of input
    pub async fn run_interactive(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre!("Failed to initialize readline: {}", e))?;
        let prompt = format!("{} ", self.repl.prompt.bright_green());

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    if self.repl.history {
                        let _ = rl.add_history_entry(input);
                    }
                    if self.handle_line(input).await? == Flow::Quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C at the prompt only clears the line
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Execute every line of `reader` until it ends or a `quit` is read
    pub async fn run_script<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (i, line) in reader.lines().enumerate() {
            let line = line.context("Failed to read script")?;
            debug!(line_no = i + 1, %line, "Session::run_script: line");
            if self.handle_line(&line).await? == Flow::Quit {
                info!(line_no = i + 1, "Script quit early");
                break;
            }
        }
        Ok(())
    }

    /// Run the automatic service until its round limit or Ctrl+C
    async fn run_auto(&self, ticks: Option<u64>) -> Result<ServiceSummary> {
        self.run_auto_until(ticks, tokio::signal::ctrl_c()).await
    }

    /// Run the automatic service, stopping early when `interrupt` resolves `Ok`
    ///
    /// If `interrupt` fails the service keeps running to its own end.
    async fn run_auto_until<F>(&self, ticks: Option<u64>, interrupt: F) -> Result<ServiceSummary>
    where
        F: Future<Output = io::Result<()>>,
    {
        info!(?ticks, interval_ms = self.service.interval_ms, "Starting automatic service");
        if self.print_replies {
            println!(
                "{}",
                format!(
                    "Automatic service every {} ms (Ctrl+C to stop)...",
                    self.service.interval_ms
                )
                .bright_cyan()
            );
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (tx, mut rx) = mpsc::channel::<ServiceEvent>(16);

        let print = self.print_replies;
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if print {
                    print_event(&event);
                }
            }
        });

        let service = AutoService::new(self.service.clone(), Arc::clone(&self.queue)).with_max_ticks(ticks);
        let mut handle = tokio::spawn(service.run(shutdown_rx, tx));

        let finished = tokio::select! {
            joined = &mut handle => Ok(joined?),
            signal = interrupt => Err(signal),
        };
        let summary = match finished {
            Ok(summary) => summary,
            Err(Ok(())) => {
                debug!("Session::run_auto: interrupted, signalling shutdown");
                let _ = shutdown_tx.send(true);
                handle.await?
            }
            Err(Err(e)) => {
                warn!(error = %e, "Cannot listen for Ctrl+C, automatic service runs until it stops");
                handle.await?
            }
        };

        // the service dropped its sender, so the printer drains and exits
        printer.await?;
        Ok(summary)
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "admitq: patient admission queue".bright_cyan().bold());
        println!("Type {} for help, {} to quit", "help".yellow(), "quit".yellow());
        println!();
    }
}

/// Join patients with the queue separator
pub fn render_patients(patients: &[Patient]) -> String {
    patients
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(QUEUE_SEPARATOR)
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Admitted { .. } | Reply::Updated { .. } => println!("{} {}", "✓".green(), reply),
        Reply::Served(_) => println!("{} {}", "→".bright_cyan(), reply),
        Reply::Failed(_) => println!("{} {}", "!".yellow(), reply),
        Reply::Quit => {}
        _ => println!("{}", reply),
    }
}

fn print_event(event: &ServiceEvent) {
    match &event.outcome {
        Ok(patient) => println!("{} Serving patient: {}", "→".bright_cyan(), patient),
        Err(e) => println!("{} {}", "!".yellow(), e),
    }
    print_reply(&Reply::Queue(render_patients(&event.queue)));
}
