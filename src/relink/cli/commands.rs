//! # CLI Layer
//!
//! One possible client of the relink library. This is the only place that
//! touches stdout/stderr, reads the environment, or decides when the scene
//! file is written back.
//!
//! ## Structure
//!
//! - `run()`: dispatch (called by `main.rs` after the logger is installed)
//! - `init_context()`: resolves config and database locations, opens the store
//! - `handle_*()`: per-command handlers that call [`RelinkApi`] and print
//!
//! ## Locations
//!
//! `--config` and `--db` win. Otherwise both files live in `$RELINK_HOME`
//! when it is set, else in the platform config and data directories.

use super::render::{
    print_changes, print_history, print_messages, print_nodes, print_snapshot, print_states,
};
use super::setup::{Cli, Commands, VersionTypeArg};
use directories::ProjectDirs;
use relink::api::{CmdMessage, RelinkApi};
use relink::config::{RelinkConfig, CONFIG_FILENAME};
use relink::error::{RelinkError, Result};
use relink::nodes::script::NukeScript;
use relink::store::sqlite::{SqliteStore, DB_FILENAME};
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "RELINK_HOME";

struct AppContext {
    store: SqliteStore,
    config: RelinkConfig,
    config_path: PathBuf,
    db_path: PathBuf,
}

impl AppContext {
    fn api(self, script: NukeScript) -> RelinkApi<SqliteStore, NukeScript> {
        RelinkApi::new(self.store, script, self.config)
    }

    /// An API with no scene loaded, for commands that only read the store.
    fn store_api(self) -> RelinkApi<SqliteStore, NukeScript> {
        self.api(NukeScript::default())
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = init_context(&cli)?;

    match cli.command {
        Commands::Nodes {
            script,
            pattern,
            regex,
            selected,
        } => handle_nodes(ctx, &script, pattern, regex, selected),
        Commands::Preview {
            script,
            old,
            new,
            regex,
            selected,
        } => handle_preview(ctx, &script, old.zip(new), regex, selected),
        Commands::Relink {
            script,
            old,
            new,
            regex,
            dry_run,
            output,
        } => handle_relink(ctx, &script, &old, &new, regex, dry_run, output),
        Commands::Redirect {
            script,
            selected,
            output,
        } => handle_redirect(ctx, &script, selected, output),
        Commands::Save {
            script,
            label,
            version_type,
            nodes,
            selected,
            force,
        } => handle_save(ctx, &script, label, version_type, nodes, selected, force),
        Commands::Restore {
            script,
            version,
            output,
        } => handle_restore(ctx, &script, &version, output),
        Commands::Show { version } => handle_show(ctx, &version),
        Commands::States => handle_states(ctx),
        Commands::History => handle_history(ctx),
        Commands::Config { save } => handle_config(ctx, save),
    }
}

/// Config and data directories, honouring `$RELINK_HOME`.
fn home_dirs() -> Result<(PathBuf, PathBuf)> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        let home = PathBuf::from(home);
        return Ok((home.clone(), home));
    }
    let proj_dirs = ProjectDirs::from("com", "relink", "relink")
        .ok_or_else(|| RelinkError::Api("Could not determine a home directory".to_string()))?;
    Ok((
        proj_dirs.config_dir().to_path_buf(),
        proj_dirs.data_dir().to_path_buf(),
    ))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let (config_dir, data_dir) = home_dirs()?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join(CONFIG_FILENAME));
    let config = RelinkConfig::load_file(&config_path)?
        .with_overrides(cli.old_dir.clone(), cli.new_dir.clone());

    let db_path = cli.db.clone().unwrap_or_else(|| data_dir.join(DB_FILENAME));
    let store = SqliteStore::open(&db_path)?;
    log::debug!(
        "Using config {} and database {}",
        config_path.display(),
        db_path.display()
    );

    Ok(AppContext {
        store,
        config,
        config_path,
        db_path,
    })
}

/// Persist the edited script, to `output` when given, else in place if it changed.
fn write_script(mut script: NukeScript, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            script.save_as(&path)?;
            log::info!("Wrote {}", path.display());
        }
        None if script.is_dirty() => {
            script.save()?;
            if let Some(path) = script.source() {
                log::info!("Wrote {}", path.display());
            }
        }
        None => log::debug!("Script unchanged, not writing"),
    }
    Ok(())
}

fn handle_nodes(
    ctx: AppContext,
    script: &Path,
    pattern: Option<String>,
    regex: bool,
    selected: bool,
) -> Result<()> {
    let api = ctx.api(NukeScript::open(script)?);
    let mut result = match pattern {
        Some(pattern) => api.find_nodes_with_paths(&pattern, regex)?,
        None => api.list_nodes(selected)?,
    };
    if selected {
        result.listed_nodes.retain(|node| node.selected);
    }
    print_nodes(&result.listed_nodes);
    print_messages(&result.messages);
    Ok(())
}

fn handle_preview(
    ctx: AppContext,
    script: &Path,
    relink: Option<(String, String)>,
    regex: bool,
    selected: bool,
) -> Result<()> {
    let api = ctx.api(NukeScript::open(script)?);
    let result = match relink {
        Some((old, new)) => api.preview_relink(&old, &new, regex)?,
        None => api.preview_redirect(selected)?,
    };
    print_changes(&result.planned_changes);
    print_messages(&result.messages);
    Ok(())
}

fn handle_relink(
    ctx: AppContext,
    script: &Path,
    old: &str,
    new: &str,
    regex: bool,
    dry_run: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut api = ctx.api(NukeScript::open(script)?);
    if dry_run {
        let result = api.preview_relink(old, new, regex)?;
        print_changes(&result.planned_changes);
        print_messages(&result.messages);
        return Ok(());
    }

    let result = api.perform_relink(old, new, regex)?;
    print_messages(&result.messages);
    write_script(api.into_nodes(), output)
}

fn handle_redirect(
    ctx: AppContext,
    script: &Path,
    selected: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut api = ctx.api(NukeScript::open(script)?);
    let result = api.execute_replacement(selected)?;
    print_messages(&result.messages);
    write_script(api.into_nodes(), output)
}

fn handle_save(
    ctx: AppContext,
    script: &Path,
    label: Option<String>,
    version_type: Option<VersionTypeArg>,
    nodes: Vec<String>,
    selected: bool,
    force: bool,
) -> Result<()> {
    let version_type = version_type.unwrap_or(if label.is_some() {
        VersionTypeArg::UserInput
    } else {
        VersionTypeArg::Timestamp
    });
    let kind = version_type.into_kind(label)?;

    let mut api = ctx.api(NukeScript::open(script)?);
    let result = if nodes.is_empty() {
        api.save_selected_state(&kind, selected, force)?
    } else {
        api.save_state_as(&kind, &nodes, force)?
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_restore(
    ctx: AppContext,
    script: &Path,
    version: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut api = ctx.api(NukeScript::open(script)?);
    let result = api.restore_state(version)?;
    print_messages(&result.messages);
    if result.restored.is_some() {
        write_script(api.into_nodes(), output)?;
    }
    Ok(())
}

fn handle_show(ctx: AppContext, version: &str) -> Result<()> {
    let api = ctx.store_api();
    let result = api.load_state(version)?;
    if let Some(snapshot) = &result.snapshot {
        print_snapshot(snapshot);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_states(ctx: AppContext) -> Result<()> {
    let result = ctx.store_api().list_states()?;
    print_states(&result.states);
    print_messages(&result.messages);
    Ok(())
}

fn handle_history(ctx: AppContext) -> Result<()> {
    let result = ctx.store_api().relink_history()?;
    print_history(&result.history);
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: AppContext, save: bool) -> Result<()> {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(unset)".to_string());
    println!("old_directory = {}", show(&ctx.config.old_directory));
    println!("new_directory = {}", show(&ctx.config.new_directory));
    println!("config        = {}", ctx.config_path.display());
    println!("database      = {}", ctx.db_path.display());

    if save {
        ctx.config.save_file(&ctx.config_path)?;
        print_messages(&[CmdMessage::success(format!(
            "Saved {}",
            ctx.config_path.display()
        ))]);
    }
    Ok(())
}
