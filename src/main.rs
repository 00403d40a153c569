//! Tally CLI - a personal todo list backed by a local daemon.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tally::{
    Config, Daemon, DaemonConfig, Dispatcher, Filter, Priority, Session, SocketBackend, Todo, View,
    is_daemon_running,
};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

mod cli;

use cli::{Cli, Command};

/// A command that runs through a client session.
enum Action {
    List(Filter),
    Add { text: String, priority: Option<Priority> },
    Toggle(i64),
    Delete(i64),
    Clear,
    Export,
}

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("tally.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(dir) = &cli.dir {
        config.root = Some(dir.clone());
    }
    Ok(config)
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")
}

fn format_todo(todo: &Todo) -> String {
    let check = if todo.done { "[x]".green() } else { "[ ]".normal() };
    let text = if todo.done {
        todo.text.dimmed().strikethrough()
    } else {
        todo.text.normal()
    };
    format!(
        "{} {} {} {}",
        check,
        format!("#{}", todo.id).cyan(),
        text,
        todo.created_at.dimmed()
    )
}

fn render(view: &View<'_>) {
    if let Some(status) = view.status {
        println!("{} {}", "→".blue(), status.bold());
    }

    if view.show_filters {
        let tabs: Vec<String> = view
            .tabs()
            .into_iter()
            .map(|(_, label, selected)| if selected { label.bold().to_string() } else { label.dimmed().to_string() })
            .collect();
        println!("{}", tabs.join("  "));
    }

    match view.empty_state {
        Some(empty) => println!("{}", empty.message().dimmed()),
        None => {
            for todo in &view.visible {
                println!("{}", format_todo(todo));
            }
        }
    }

    if view.can_clear_completed {
        println!(
            "{}",
            format!("{} completed; `tally clear` removes them", view.counts.done).dimmed()
        );
    }
}

/// Load the list, run one command through a session and print the result.
fn run_client(action: Action, config: &Config) -> Result<()> {
    let root = config.root();
    let export_dir = config.export_dir();
    let mut settings = config.session_settings();
    if let Action::Add {
        priority: Some(priority),
        ..
    } = &action
    {
        settings.default_priority = *priority;
    }

    let rt = runtime()?;
    let local = LocalSet::new();
    local.block_on(&rt, async move {
        let backend = SocketBackend::connect(&root, true, Some(export_dir.as_path()))
            .await
            .context("Failed to connect to daemon")?;
        let mut dispatcher = Dispatcher::new(backend);
        let mut session = Session::new(settings);

        let load = session.load();
        dispatcher.run(&mut session, load).await;

        match action {
            Action::List(filter) => session.set_filter(filter),

            Action::Add { text, .. } => {
                session.set_input(text);
                let add = session.submit()?;
                dispatcher.run(&mut session, add).await;
                if !session.ui().input.is_empty() {
                    eyre::bail!("Backend did not confirm the new todo");
                }
            }

            Action::Toggle(id) => {
                let toggle = session.toggle(id)?;
                dispatcher.run(&mut session, toggle).await;
            }

            Action::Delete(id) => {
                let delete = session.delete(id)?;
                dispatcher.run(&mut session, delete).await;
            }

            Action::Clear => {
                let clear = session.clear_completed()?;
                dispatcher.run(&mut session, clear).await;
            }

            Action::Export => {
                let export = session.export();
                dispatcher.run(&mut session, export).await;
            }
        }

        render(&session.view(Instant::now()));
        Ok::<(), eyre::Report>(())
    })
}

fn run_daemon(root: &Path, export_dir: PathBuf) -> Result<()> {
    println!("{} Starting daemon for {}", "→".blue(), root.display());

    let config = DaemonConfig::new(root).with_export_dir(export_dir);
    let mut daemon = Daemon::new(config);

    let rt = runtime()?;
    rt.block_on(daemon.run()).context("Daemon error")
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let root = config.root();

    match cli.command {
        Command::Daemon { export_dir } => {
            run_daemon(&root, export_dir.unwrap_or_else(|| config.export_dir()))?;
        }

        Command::DaemonStop => {
            if !is_daemon_running(&root) {
                println!("{} Daemon is not running", "✗".red());
                std::process::exit(1);
            }

            runtime()?.block_on(async {
                let client = SocketBackend::connect(&root, false, None)
                    .await
                    .context("Failed to connect to daemon")?;
                client.shutdown().await.context("Failed to shutdown daemon")
            })?;
            println!("{} Daemon stopped", "✓".green());
        }

        Command::DaemonStatus => {
            if is_daemon_running(&root) {
                println!("{} Daemon is running", "✓".green());

                let responding = runtime()?.block_on(async {
                    match SocketBackend::connect(&root, false, None).await {
                        Ok(client) => client.ping().await.is_ok(),
                        Err(_) => false,
                    }
                });
                if responding {
                    println!("  {} Responding to requests", "✓".green());
                }
            } else {
                println!("{} Daemon is not running", "✗".red());
            }
        }

        Command::List { filter } => run_client(Action::List(filter), &config)?,
        Command::Add { text, priority } => run_client(
            Action::Add {
                text: text.join(" "),
                priority,
            },
            &config,
        )?,
        Command::Toggle { id } => run_client(Action::Toggle(id), &config)?,
        Command::Delete { id } => run_client(Action::Delete(id), &config)?,
        Command::Clear => run_client(Action::Clear, &config)?,
        Command::Export => run_client(Action::Export, &config)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
