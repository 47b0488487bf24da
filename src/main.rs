mod api;
mod cli;
mod config;
mod editor;
mod effects;
mod error;
mod logging;
mod lookup;
mod models;
mod reorder;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::Config;
use api::TaskApi;
use effects::Dispatcher;
use lookup::{ask_user_confirmation, resolve, Resolution};
use models::{NewTask, Status, Task, TaskId};
use reorder::{Container, DragLocation, DragResult};
use state::{TaskCollection, Transition};
use ui::run_tui;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        print_completions(shell);
        return Ok(());
    }

    let config = Config::new(&cli.api_url, cli.timeout_secs, &cli.log_level, cli.log_dir.clone())?;
    let _logger = match logging::init_logging(&config.log_level, &config.log_dir) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err}");
            None
        }
    };

    let rt = tokio::runtime::Runtime::new()?;
    let api = TaskApi::new(&config)?;

    match cli.command {
        None | Some(Commands::Tui) => {
            run_tui(api, rt.handle().clone())?;
        }
        Some(command) => {
            rt.block_on(run_command(api, command))?;
        }
    }

    Ok(())
}

async fn run_command(api: TaskApi, command: Commands) -> Result<()> {
    let tasks = api
        .list()
        .await
        .with_context(|| format!("Error fetching tasks from {}", api.base_url()))?;
    let tasks = TaskCollection::from_remote(tasks);
    let mut dispatcher = Dispatcher::new(api.clone(), tokio::runtime::Handle::current());

    match command {
        Commands::List { board } => {
            if board {
                print_board(&tasks);
            } else {
                print_list(&tasks);
            }
        }
        Commands::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                println!("Error: task name cannot be empty.");
                return Ok(());
            }
            let created = api
                .create(&NewTask::new(name, tasks.next_position()))
                .await
                .context("Error adding task")?;
            println!("Task added with ID {}", created.id);
        }
        Commands::Rename { task, name } => {
            let Some(id) = resolve_task(&tasks, &task)? else {
                return Ok(());
            };
            match tasks.rename(&id, &name)? {
                Some(transition) => {
                    commit(&mut dispatcher, transition).await;
                    println!("Task {} renamed to '{}'", id, name.trim());
                }
                None => println!("Name unchanged."),
            }
        }
        Commands::Toggle { task } => {
            let Some(id) = resolve_task(&tasks, &task)? else {
                return Ok(());
            };
            let transition = tasks.toggle(&id)?;
            let status = transition
                .collection
                .get(&id)
                .map(|task| task.status)
                .unwrap_or_default();
            commit(&mut dispatcher, transition).await;
            println!("Task {} is now {}", id, status.title());
        }
        Commands::Delete { task } => {
            let Some(id) = resolve_task(&tasks, &task)? else {
                return Ok(());
            };
            let transition = tasks.delete(&id)?;
            commit(&mut dispatcher, transition).await;
            println!("Task {} deleted", id);
        }
        Commands::Move { task, to, column } => {
            let Some(id) = resolve_task(&tasks, &task)? else {
                return Ok(());
            };
            let container = column
                .as_deref()
                .map(str::parse::<Container>)
                .transpose()?;
            let board = matches!(container, Some(c) if c != Container::List);
            let source = tasks
                .location_of(&id, board)
                .with_context(|| format!("task {id} disappeared"))?;
            let drag = DragResult {
                task_id: id.clone(),
                source,
                destination: Some(DragLocation::new(container.unwrap_or(Container::List), to)),
            };
            match tasks.reorder(&drag)? {
                Some(transition) => {
                    let moved = transition.collection.get(&id).cloned();
                    commit(&mut dispatcher, transition).await;
                    if let Some(moved) = moved {
                        println!(
                            "Task {} moved to position {} ({})",
                            id,
                            moved.position,
                            moved.status.title()
                        );
                    }
                }
                None => println!("Task {} is already there.", id),
            }
        }
        Commands::Tui | Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Sends a transition's effects and waits for them; a one-shot command
/// must not exit while they are in flight.
async fn commit(dispatcher: &mut Dispatcher, transition: Transition) {
    dispatcher.dispatch(transition.effects);
    dispatcher.settle().await;
}

fn resolve_task(tasks: &TaskCollection, reference: &str) -> Result<Option<TaskId>> {
    match resolve(tasks, reference) {
        Resolution::Exact(task) => Ok(Some(task.id.clone())),
        Resolution::Suggested { task, .. } => {
            if ask_user_confirmation(reference, task)? {
                Ok(Some(task.id.clone()))
            } else {
                println!("Operation cancelled.");
                Ok(None)
            }
        }
        Resolution::Missing => {
            println!("Task '{}' not found.", reference);
            Ok(None)
        }
    }
}

fn task_line(task: &Task) -> String {
    let marker = if task.status.is_completed() { "[x]" } else { "[ ]" };
    let suffix = if task.status == Status::InProgress { " (in progress)" } else { "" };
    format!("{} {}{} | ID: {}", marker, task.name, suffix, task.id)
}

fn print_list(tasks: &TaskCollection) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    println!("Tasks:");
    println!("------");
    for task in tasks.iter() {
        println!("{:>3}. {}", task.position, task_line(task));
    }
}

fn print_board(tasks: &TaskCollection) {
    for status in Status::ALL {
        let column = tasks.column(status);
        println!("{} ({})", status.title(), column.len());
        println!("------");
        for (index, task) in column.iter().enumerate() {
            println!("{:>3}. {} | ID: {}", index, task.name, task.id);
        }
        println!();
    }
}

fn print_completions(shell: &str) {
    use clap_complete::{generate, Shell};
    let shell = shell.to_lowercase();
    let shell_enum = match shell.as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" => Shell::PowerShell,
        _ => {
            println!("Unsupported shell: {}", shell);
            return;
        }
    };
    let mut cmd = Cli::command();
    generate(shell_enum, &mut cmd, "taskboard", &mut std::io::stdout());
}
