#![forbid(unsafe_code)]

pub mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{self, Config};
use crate::output::table::Table;
use crate::task::{Action, Repository, TaskManager};

pub const LOG_ENV: &str = "TODOS_LOG";

#[derive(Debug, Parser)]
#[command(name = "todos", version, about = "Minimal command-line task tracker")]
pub struct Cli {
    /// Task store to use instead of the configured store.path
    #[arg(long = "store", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a task
    Add(AddArgs),
    /// Mark a task as done
    Done(NumberArgs),
    /// Mark a task as not done
    Undone(NumberArgs),
    /// Delete a task; later tasks are renumbered
    #[command(alias = "remove")]
    Rm(NumberArgs),
    /// Print the task list
    #[command(alias = "ls")]
    List(ListArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Task description; words are joined with single spaces
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub description: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct NumberArgs {
    /// Task number as shown by `list`
    pub number: usize,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,
    /// Output as CSV
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

pub fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Logs go to stderr so they never mix with the task list.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        Some(Commands::Config(args)) => cmd_config(args),
        Some(Commands::Completion(args)) => Ok(cmd_completion(&args)),
        Some(Commands::Version) => Ok(cmd_version()),
        cmd => {
            let cfg = config::load()?;
            run_with_config(
                Cli {
                    store: cli.store,
                    cmd,
                },
                &cfg,
            )
        }
    }
}

/// Runs `cli` against an already loaded config instead of the user's file.
pub fn run_with_config(cli: Cli, cfg: &Config) -> anyhow::Result<ExitCode> {
    let store = cli.store;
    let action = match cli.cmd {
        None => return cmd_session(cfg, store),
        Some(Commands::List(args)) => return cmd_list(cfg, store, &args),
        Some(Commands::Config(args)) => return cmd_config(args),
        Some(Commands::Completion(args)) => return Ok(cmd_completion(&args)),
        Some(Commands::Version) => return Ok(cmd_version()),
        Some(Commands::Add(args)) => Action::Add {
            description: args.description.join(" "),
        },
        Some(Commands::Done(args)) => Action::Update {
            number: args.number,
            done: true,
        },
        Some(Commands::Undone(args)) => Action::Update {
            number: args.number,
            done: false,
        },
        Some(Commands::Rm(args)) => Action::Delete {
            number: args.number,
        },
    };
    cmd_apply(cfg, store, action)
}

fn open_manager(cfg: &Config, store_override: Option<PathBuf>) -> anyhow::Result<TaskManager> {
    let path = match store_override {
        Some(p) => p,
        None => config::expand_path(&cfg.store.path)?,
    };
    let repo = Repository::new(path.clone()).with_pretty(cfg.store.pretty);
    TaskManager::open(repo).with_context(|| format!("failed to load tasks from {}", path.display()))
}

fn cmd_session(cfg: &Config, store: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let mut manager = open_manager(cfg, store)?;
    session::run(
        &mut manager,
        std::io::stdin().lock(),
        std::io::stdout().lock(),
        &cfg.ui,
    )?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_apply(cfg: &Config, store: Option<PathBuf>, action: Action) -> anyhow::Result<ExitCode> {
    let mut manager = open_manager(cfg, store)?;
    manager.execute(action);
    manager.save().with_context(|| {
        format!(
            "failed to save tasks to {}",
            manager.repository().path().display()
        )
    })?;
    println!("{manager}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_list(cfg: &Config, store: Option<PathBuf>, args: &ListArgs) -> anyhow::Result<ExitCode> {
    let manager = open_manager(cfg, store)?;
    let tasks = manager.tasks();
    let stdout = std::io::stdout().lock();

    if args.json {
        serde_json::to_writer_pretty(stdout, tasks)?;
        println!();
    } else if args.csv {
        Table::for_tasks(tasks).write_csv(stdout)?;
    } else if tasks.is_empty() {
        println!("{manager}");
    } else {
        Table::for_tasks(tasks).write_to(stdout)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_completion(args: &CompletionArgs) -> ExitCode {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "todos", &mut std::io::stdout());
    ExitCode::SUCCESS
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<ExitCode> {
    match args.cmd {
        ConfigCmd::List => {
            print!("{}", config::list_resolved_toml()?);
        }
        ConfigCmd::Set(set) => {
            config::set_value_string(&set.key, &set.value)?;
            println!("Set {} = {}", set.key, set.value);
        }
        ConfigCmd::Get(get) => {
            let value = config::get_value_string(&get.key).with_context(|| {
                format!(
                    "cannot read '{}' - use 'todos config list' to see available keys",
                    get.key
                )
            })?;
            println!("{value}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_version() -> ExitCode {
    println!("todos version {}", env!("CARGO_PKG_VERSION"));
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["todos", "add", "buy", "-oat", "milk"]).unwrap();
        let Some(Commands::Add(args)) = cli.cmd else {
            panic!("expected add");
        };
        assert_eq!(args.description.join(" "), "buy -oat milk");

        let cli = Cli::try_parse_from(["todos", "--store", "/tmp/t.json", "rm", "2"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/t.json")));
        assert!(matches!(cli.cmd, Some(Commands::Rm(NumberArgs { number: 2 }))));

        assert!(Cli::try_parse_from(["todos", "done", "two"]).is_err());
        assert!(Cli::try_parse_from(["todos", "list", "--json", "--csv"]).is_err());
        assert!(Cli::try_parse_from(["todos"]).unwrap().cmd.is_none());
    }
}
