//! Interactive shell over a `BPlusTreeMap<String, String>`.
//!
//! # Commands
//!
//! - `insert <key> <value>` - Insert a pair; never overwrites
//! - `delete <key>` - Remove a key
//! - `update <key> <value>` - Replace the value of an existing key
//! - `exists <key>` - Check if a key exists
//! - `get <key>` - Show the value of a key
//! - `count` - Number of stored keys
//! - `list` - All keys in order
//! - `range <start> <end>` - Pairs strictly between two keys
//! - `traverse` - Walk the leaf chain and print a table
//! - `clear` - Remove everything
//! - `height` - Levels from root to leaf
//! - `stats` - Shape of the tree
//! - `help` - Show help
//! - `exit`, `quit` - Leave the shell

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use leafline::{BPlusTreeMap, Order};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use thiserror::Error;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// B+ tree interactive shell
#[derive(Parser, Debug)]
#[command(name = "leafline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Branching order of the tree (at least 2)
    #[arg(short, long, default_value_t = Order::DEFAULT.get())]
    order: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Shell errors
#[derive(Debug, Error, PartialEq, Eq)]
enum ReplError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Insert(String, String),
    Delete(String),
    Update(String, String),
    Exists(String),
    Get(String),
    Count,
    List,
    Range(String, String),
    Traverse,
    Clear,
    Height,
    Stats,
    Help,
    Exit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    fn parse(line: &str) -> Result<Option<Self>, ReplError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return Ok(None);
        };

        let command = match (name, args) {
            ("insert", [key, value]) => Self::Insert((*key).to_owned(), (*value).to_owned()),
            ("insert", _) => return Err(ReplError::Usage("insert <key> <value>")),
            ("delete", [key]) => Self::Delete((*key).to_owned()),
            ("delete", _) => return Err(ReplError::Usage("delete <key>")),
            ("update", [key, value]) => Self::Update((*key).to_owned(), (*value).to_owned()),
            ("update", _) => return Err(ReplError::Usage("update <key> <value>")),
            ("exists", [key]) => Self::Exists((*key).to_owned()),
            ("exists", _) => return Err(ReplError::Usage("exists <key>")),
            ("get", [key]) => Self::Get((*key).to_owned()),
            ("get", _) => return Err(ReplError::Usage("get <key>")),
            ("range", [start, end]) => Self::Range((*start).to_owned(), (*end).to_owned()),
            ("range", _) => return Err(ReplError::Usage("range <start> <end>")),
            ("count", []) => Self::Count,
            ("list", []) => Self::List,
            ("traverse", []) => Self::Traverse,
            ("clear", []) => Self::Clear,
            ("height", []) => Self::Height,
            ("stats", []) => Self::Stats,
            ("help", _) => Self::Help,
            ("exit" | "quit", _) => Self::Exit,
            ("count", _) => return Err(ReplError::Usage("count")),
            ("list", _) => return Err(ReplError::Usage("list")),
            ("traverse", _) => return Err(ReplError::Usage("traverse")),
            ("clear", _) => return Err(ReplError::Usage("clear")),
            ("height", _) => return Err(ReplError::Usage("height")),
            ("stats", _) => return Err(ReplError::Usage("stats")),
            (other, _) => return Err(ReplError::UnknownCommand(other.to_owned())),
        };
        Ok(Some(command))
    }
}

enum Flow {
    Continue,
    Exit,
}

struct Shell {
    map: BPlusTreeMap<String, String>,
}

impl Shell {
    fn new(order: Order) -> Self {
        Self { map: BPlusTreeMap::with_order(order) }
    }

    /// Runs one command, writing its report to `out`.
    fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        match command {
            Command::Insert(key, value) => {
                let report = format!("{key}:{value}");
                if self.map.insert(key.clone(), value) {
                    writeln!(out, "{GREEN}Inserted: {report}{RESET}")?;
                } else {
                    writeln!(out, "{RED}Key {key} already exists. Insertion aborted.{RESET}")?;
                }
            }
            Command::Delete(key) => match self.map.remove(&key) {
                Some(_) => writeln!(out, "{GREEN}Deleted: {key}{RESET}")?,
                None => writeln!(out, "{RED}Key '{key}' not found.{RESET}")?,
            },
            Command::Update(key, value) => {
                let report = format!("{key}:{value}");
                match self.map.update(key.clone(), value) {
                    Ok(_) => writeln!(out, "{GREEN}Updated: {report}{RESET}")?,
                    Err(err) => writeln!(out, "{RED}Error: {err} ('{key}'){RESET}")?,
                }
            }
            Command::Exists(key) => {
                if self.map.contains_key(&key) {
                    writeln!(out, "{GREEN}Key '{key}' exists.{RESET}")?;
                } else {
                    writeln!(out, "{RED}Key '{key}' does not exist.{RESET}")?;
                }
            }
            Command::Get(key) => match self.map.get(&key) {
                Some(value) => writeln!(out, "{GREEN}Value for key '{key}': {value}{RESET}")?,
                None => writeln!(out, "{RED}Key '{key}' not found.{RESET}")?,
            },
            Command::Count => writeln!(out, "{GREEN}Total keys: {}{RESET}", self.map.len())?,
            Command::List => {
                let keys = self.map.keys();
                writeln!(out, "{GREEN}Keys: {keys:?}{RESET}")?;
            }
            Command::Range(start, end) => {
                writeln!(out, "{GREEN}Key-Value Pairs in Range:{RESET}")?;
                for (key, value) in self.map.range(&start, &end) {
                    writeln!(out, "{GREEN}  {key}: {value}{RESET}")?;
                }
            }
            Command::Traverse => self.traverse(out)?,
            Command::Clear => {
                self.map.clear();
                writeln!(out, "{GREEN}B+ Tree cleared.{RESET}")?;
            }
            Command::Height => {
                writeln!(out, "{GREEN}Height of the B+ Tree: {}{RESET}", self.map.height())?;
            }
            Command::Stats => writeln!(out, "{GREEN}{:#}{RESET}", self.map.stats())?,
            Command::Help => print_help(out)?,
            Command::Exit => {
                writeln!(out, "{GREEN}Exiting...{RESET}")?;
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    fn traverse(&self, out: &mut impl Write) -> io::Result<()> {
        let key_width = self.map.iter().map(|(k, _)| k.len()).max().unwrap_or(0).max(3);
        let value_width = self.map.iter().map(|(_, v)| v.len()).max().unwrap_or(0).max(5);
        let rule = format!("+-------+-{}-+-{}-+", "-".repeat(key_width), "-".repeat(value_width));

        writeln!(out, "{CYAN}{rule}")?;
        writeln!(out, "| Index | {:<key_width$} | {:<value_width$} |", "Key", "Value")?;
        writeln!(out, "{rule}")?;
        for (index, (key, value)) in self.map.iter().enumerate() {
            writeln!(out, "| {index:>5} | {key:<key_width$} | {value:<value_width$} |")?;
        }
        writeln!(out, "{rule}{RESET}")
    }
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{YELLOW}Commands:{RESET}
{GREEN}  insert <key> <value>  Insert a pair (existing keys are left alone)
  delete <key>          Delete a key
  update <key> <value>  Update the value for an existing key
  exists <key>          Check if a key exists
  get <key>             Retrieve a value by key
  count                 Total number of keys
  list                  List all keys
  range <start> <end>   Pairs strictly between start and end
  traverse              Walk the leaves and display a table
  clear                 Remove every key
  height                Height of the tree
  stats                 Size and shape of the tree
  help                  Show this help
  exit, quit            Exit{RESET}"
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; structural events are emitted at trace level.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(io::stderr)
            .init();
    }

    let order = Order::new(cli.order)?;
    let mut shell = Shell::new(order);
    let mut stdout = io::stdout();

    println!("{CYAN}Welcome to the B+ Tree shell (order {order}).{RESET}");
    print_help(&mut stdout)?;

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl = DefaultEditor::with_config(config)?;

    loop {
        match rl.readline("leafline> ") {
            Ok(line) => match Command::parse(&line) {
                Ok(Some(command)) => {
                    if let Flow::Exit = shell.execute(command, &mut stdout)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => println!("{RED}{err}{RESET}"),
            },
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}
