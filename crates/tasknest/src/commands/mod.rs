//! Command handlers for the tasknest CLI.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tasknest_app::{StateStore, TaskService};
use tasknest_core::{MAX_INDENT, TaskFilter, TaskId};

use crate::Command;
use crate::view;

/// Execute a parsed command against the service.
pub fn run<S: StateStore>(cmd: Command, service: &mut TaskService<S>) -> Result<()> {
    match cmd {
        Command::Add { text, parent } => add(service, &text, parent.map(TaskId)),
        Command::Edit { id, text } => edit(service, TaskId(id), &text),
        Command::Done { id } => done(service, TaskId(id)),
        Command::Rm { id } => rm(service, TaskId(id)),
        Command::Indent { id } => indent(service, TaskId(id)),
        Command::Outdent { id } => outdent(service, TaskId(id)),
        Command::Move { from, to } => move_task(service, from, to),
        Command::Ls { filter } => ls(service, &filter),
        Command::Find { query } => find(service, &query),
        Command::Stats => stats(service),
        Command::ClearDone => clear_done(service),
        Command::ClearAll => clear_all(service),
        Command::Export => export(service),
        Command::Import { path } => import(service, &path),
    }
}

fn persist<S: StateStore>(service: &mut TaskService<S>) {
    if !service.save() {
        eprintln!("warning: could not persist tasks");
    }
}

fn add<S: StateStore>(service: &mut TaskService<S>, text: &str, parent: Option<TaskId>) -> Result<()> {
    let Some(task) = service.add(text, parent) else {
        bail!("nothing to add: text is empty or the parent does not exist");
    };
    persist(service);
    println!("{}", view::line(&task));
    Ok(())
}

fn edit<S: StateStore>(service: &mut TaskService<S>, id: TaskId, text: &str) -> Result<()> {
    // Empty edits are deletions; the engine itself never auto-deletes.
    if text.trim().is_empty() {
        return rm(service, id);
    }
    let Some(task) = service.engine_mut().update(id, text) else {
        bail!("no task with id {id}");
    };
    persist(service);
    println!("{}", view::line(&task));
    Ok(())
}

fn done<S: StateStore>(service: &mut TaskService<S>, id: TaskId) -> Result<()> {
    let Some(task) = service.engine_mut().toggle_complete(id) else {
        bail!("no task with id {id}");
    };
    persist(service);
    println!("{}", view::line(&task));
    Ok(())
}

fn rm<S: StateStore>(service: &mut TaskService<S>, id: TaskId) -> Result<()> {
    let Some(task) = service.engine_mut().delete(id) else {
        bail!("no task with id {id}");
    };
    persist(service);
    println!("removed #{} {}", task.id, task.text);
    Ok(())
}

fn indent<S: StateStore>(service: &mut TaskService<S>, id: TaskId) -> Result<()> {
    if let Some(task) = service.engine_mut().indent(id) {
        persist(service);
        println!("{}", view::line(&task));
        return Ok(());
    }
    // The engine reports failure without a reason; re-derive it here.
    match service.engine().position_of(id) {
        None => bail!("no task with id {id}"),
        Some(0) => bail!("cannot indent the first task"),
        Some(_) => bail!("task {id} is already at the maximum depth ({MAX_INDENT})"),
    }
}

fn outdent<S: StateStore>(service: &mut TaskService<S>, id: TaskId) -> Result<()> {
    if let Some(task) = service.engine_mut().outdent(id) {
        persist(service);
        println!("{}", view::line(&task));
        return Ok(());
    }
    match service.engine().position_of(id) {
        None => bail!("no task with id {id}"),
        Some(_) => bail!("task {id} is already top-level"),
    }
}

fn move_task<S: StateStore>(service: &mut TaskService<S>, from: usize, to: usize) -> Result<()> {
    if !service.engine_mut().reorder(from, to) {
        bail!("cannot move from {from} to {to}");
    }
    persist(service);
    println!("moved {from} -> {to}");
    Ok(())
}

fn ls<S: StateStore>(service: &mut TaskService<S>, filter: &str) -> Result<()> {
    let filter: TaskFilter = filter.parse()?;
    let tasks = service.engine().by_filter(filter);
    if tasks.is_empty() {
        println!("no {} tasks", filter.as_str());
        return Ok(());
    }
    println!("{}", view::listing(&tasks));
    Ok(())
}

fn find<S: StateStore>(service: &mut TaskService<S>, query: &str) -> Result<()> {
    let tasks = service.engine_mut().search(query);
    if tasks.is_empty() {
        println!("no matches");
        return Ok(());
    }
    println!("{}", view::listing(&tasks));
    Ok(())
}

fn stats<S: StateStore>(service: &mut TaskService<S>) -> Result<()> {
    println!("{}", view::stats_line(service.engine_mut().stats()));
    Ok(())
}

fn clear_done<S: StateStore>(service: &mut TaskService<S>) -> Result<()> {
    let removed = service.engine_mut().clear_completed();
    persist(service);
    println!("removed {removed} completed tasks");
    Ok(())
}

fn clear_all<S: StateStore>(service: &mut TaskService<S>) -> Result<()> {
    let removed = service.engine_mut().clear_all();
    persist(service);
    println!("removed {removed} tasks");
    Ok(())
}

fn export<S: StateStore>(service: &mut TaskService<S>) -> Result<()> {
    println!("{}", service.engine().export_snapshot());
    Ok(())
}

fn import<S: StateStore>(service: &mut TaskService<S>, path: &Path) -> Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !service.engine_mut().import_snapshot(&contents) {
        bail!("{} is not a valid snapshot", path.display());
    }
    persist(service);
    println!("imported {} tasks", service.engine().len());
    Ok(())
}
