//! Session command parsing

use thiserror::Error;

use crate::domain::PriorityClass;

/// Errors from parsing a command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid age '{0}': expected a non-negative integer")]
    InvalidAge(String),

    #[error("{0}")]
    InvalidClass(String),

    #[error("Invalid round count '{0}': expected a positive integer")]
    InvalidTicks(String),
}

/// A parsed session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add {
        name: String,
        age: u32,
        priority_class: PriorityClass,
    },
    Serve,
    Edit {
        name: String,
        age: u32,
        priority_class: PriorityClass,
    },
    Rename {
        name: String,
        new_name: String,
    },
    Queue,
    Stats,
    Auto {
        ticks: Option<u64>,
    },
    Help,
    Quit,
}

const ADD_USAGE: &str = "add <name> <age> <P|N>";
const EDIT_USAGE: &str = "edit <name> <age> <P|N>";
const RENAME_USAGE: &str = "rename <name> <new-name>";
const AUTO_USAGE: &str = "auto [rounds]";

/// `(usage, description)` pairs for the help listing
pub const COMMAND_HELP: &[(&str, &str)] = &[
    (ADD_USAGE, "Admit a patient (P = elevated, N = normal)"),
    ("serve", "Serve the next patient"),
    (EDIT_USAGE, "Change age and class of the first patient with that name"),
    (RENAME_USAGE, "Rename the first patient with that name"),
    ("queue", "Show the queue"),
    ("stats", "Show counters and the class due next"),
    (AUTO_USAGE, "Serve automatically on an interval (Ctrl+C stops)"),
    ("help", "Show this help"),
    ("quit", "Leave"),
];

impl SessionCommand {
    /// Parse one input line
    ///
    /// Blank lines and `#` comments yield `Ok(None)`. A leading `/` on the
    /// verb is accepted, so `/quit` and `quit` are the same command.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let verb = parts[0].trim_start_matches('/').to_lowercase();
        let args = &parts[1..];

        let command = match verb.as_str() {
            "add" => match args {
                [name, age, class] => Self::Add {
                    name: name.to_string(),
                    age: parse_age(age)?,
                    priority_class: parse_class(class)?,
                },
                _ => return Err(CommandError::Usage(ADD_USAGE)),
            },
            "serve" => Self::Serve,
            "edit" => match args {
                [name, age, class] => Self::Edit {
                    name: name.to_string(),
                    age: parse_age(age)?,
                    priority_class: parse_class(class)?,
                },
                _ => return Err(CommandError::Usage(EDIT_USAGE)),
            },
            "rename" => match args {
                [name, new_name] => Self::Rename {
                    name: name.to_string(),
                    new_name: new_name.to_string(),
                },
                _ => return Err(CommandError::Usage(RENAME_USAGE)),
            },
            "queue" => Self::Queue,
            "stats" => Self::Stats,
            "auto" => match args {
                [] => Self::Auto { ticks: None },
                [ticks] => Self::Auto {
                    ticks: Some(parse_ticks(ticks)?),
                },
                _ => return Err(CommandError::Usage(AUTO_USAGE)),
            },
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(parts[0].to_string())),
        };

        Ok(Some(command))
    }
}

fn parse_age(s: &str) -> Result<u32, CommandError> {
    s.parse().map_err(|_| CommandError::InvalidAge(s.to_string()))
}

fn parse_class(s: &str) -> Result<PriorityClass, CommandError> {
    s.parse().map_err(CommandError::InvalidClass)
}

fn parse_ticks(s: &str) -> Result<u64, CommandError> {
    match s.parse::<u64>() {
        Ok(0) | Err(_) => Err(CommandError::InvalidTicks(s.to_string())),
        Ok(n) => Ok(n),
    }
}
