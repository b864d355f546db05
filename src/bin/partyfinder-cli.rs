//! partyfinder-cli: manage filter presets and filter a listing stream.
//!
//! Presets live in a JSON store file. `filter` reads listing events as JSON
//! lines (stdin or a file), applies the selected preset and prints one
//! verdict per line. Highlight and join notifications go to the log on
//! stderr.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use partyfinder::domain::{Job, ListMode, UiCategory, WindowSide};
use partyfinder::feed::ListingFeedBuilder;
use partyfinder::filter::{Preset, PresetId, TermKind};
use partyfinder::gamedata::{
    GameData, StaticGameData, compute_max_item_level, player_label, searchable_duties,
    worlds_on_data_centre,
};
use partyfinder::model::ListingEvent;
use partyfinder::notify::TracingSink;
use partyfinder::store::{JsonFileRepository, PresetManager, StoreError};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "partyfinder-cli", about = "Party finder listing filter")]
struct Cli {
    /// Path to the preset store.
    #[arg(long, default_value = "partyfinder.json", global = true)]
    store: PathBuf,

    /// Path to a game data JSON export (duties, roulettes, worlds, items).
    #[arg(long, global = true)]
    game_data: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage presets.
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// Show or change global settings.
    Settings(SettingsArgs),
    /// List duties selectable for a preset's duty list.
    Duties {
        /// Case-insensitive name filter.
        query: Option<String>,
    },
    /// List public worlds on the same data centre as a home world.
    Worlds { home_world: u32 },
    /// Filter listing events (JSON lines) through the selected preset.
    Filter {
        /// Read events from this file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print a freshly created preset as JSON.
    DumpDefaultPreset,
}

#[derive(Subcommand)]
enum PresetAction {
    /// List presets; the selected one is marked with `*`.
    List,
    /// Create a preset and select it.
    New {
        #[arg(long)]
        name: Option<String>,
    },
    /// Duplicate a preset and select the copy.
    Copy { id: PresetId },
    /// Delete a preset.
    Remove { id: PresetId },
    /// Select a preset, or `none` to disable filtering.
    Select { id: String },
    Rename { id: PresetId, name: String },
    /// Print a preset as JSON.
    Show { id: PresetId },
    /// List a preset's excluded players.
    Players { id: PresetId },
    /// Add a preset from a JSON file.
    Import { file: PathBuf },
    /// Change a preset's fields.
    Edit(EditArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Whitelist,
    Blacklist,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

#[derive(clap::Args)]
struct EditArgs {
    id: PresetId,
    #[arg(long)]
    mode: Option<ModeArg>,
    #[arg(long)]
    add_duty: Vec<u32>,
    #[arg(long)]
    remove_duty: Vec<u32>,
    #[arg(long)]
    clear_duties: bool,
    /// Minimum item level, 0 for none.
    #[arg(long)]
    min_ilvl: Option<u32>,
    /// Maximum item level, 0 for none.
    #[arg(long)]
    max_ilvl: Option<u32>,
    #[arg(long)]
    allow_huge_ilvl: Option<bool>,
    /// Toggle a category by label, e.g. "High-end Duty".
    #[arg(long)]
    toggle_category: Vec<String>,
    /// Add a wanted job group, as comma-separated job names.
    #[arg(long)]
    want: Vec<String>,
    #[arg(long)]
    clear_wanted: bool,
    /// Add a job to the jobs limit.
    #[arg(long)]
    limit_job: Vec<String>,
    #[arg(long)]
    clear_limit: bool,
    #[arg(long)]
    require: Vec<String>,
    #[arg(long)]
    highlight: Vec<String>,
    #[arg(long)]
    exclude: Vec<String>,
    /// Exclude a player, as NAME@WORLD_ID.
    #[arg(long)]
    block_player: Vec<String>,
}

#[derive(clap::Args)]
struct SettingsArgs {
    #[arg(long)]
    show_when_host_ui_open: Option<bool>,
    #[arg(long)]
    window_side: Option<SideArg>,
    #[arg(long)]
    show_description_on_join: Option<bool>,
    #[arg(long)]
    always_one_player_per_job: Option<bool>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn setup_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_game_data(path: Option<&Path>) -> StaticGameData {
    match path {
        Some(path) => match StaticGameData::from_file(path) {
            Ok(data) => {
                info!(
                    duties = data.duty_count(),
                    worlds = data.world_count(),
                    "loaded game data"
                );
                data
            }
            Err(e) => {
                let path = path.display();
                fail(format_args!("failed to load game data {path}: {e}"))
            }
        },
        None => StaticGameData::with_builtin_jobs(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(format_args!("JSON serialization failed: {e}")),
    }
}

fn parse_job(name: &str) -> Job {
    let wanted = name.trim().replace(' ', "").to_lowercase();
    Job::ALL
        .into_iter()
        .find(|j| j.name().replace(' ', "").to_lowercase() == wanted)
        .unwrap_or_else(|| fail(format_args!("unknown job '{name}'")))
}

fn parse_category(label: &str) -> UiCategory {
    UiCategory::ALL
        .into_iter()
        .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
        .unwrap_or_else(|| fail(format_args!("unknown category '{label}'")))
}

fn parse_player(arg: &str) -> (&str, u32) {
    let Some((name, world)) = arg.rsplit_once('@') else {
        fail(format_args!("player must be NAME@WORLD_ID, got '{arg}'"));
    };
    match world.parse() {
        Ok(world) => (name, world),
        Err(_) => fail(format_args!("invalid world id '{world}'")),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_preset(
    mgr: &mut PresetManager<JsonFileRepository>,
    data: &dyn GameData,
    action: PresetAction,
) -> Result<(), StoreError> {
    match action {
        PresetAction::List => {
            let selected = mgr.store().selected_preset;
            for (id, preset) in mgr.store().presets_by_name() {
                let mark = if selected == Some(id) { "*" } else { " " };
                println!("{mark} {id}  {}", preset.name);
            }
        }
        PresetAction::New { name } => {
            let id = mgr.create()?;
            if let Some(name) = name {
                mgr.rename(id, &name)?;
            }
            println!("{id}");
        }
        PresetAction::Copy { id } => println!("{}", mgr.duplicate(id)?),
        PresetAction::Remove { id } => {
            let removed = mgr.remove(id)?;
            info!(preset = %id, name = %removed.name, "removed preset");
        }
        PresetAction::Select { id } => {
            let id = match id.as_str() {
                "none" => None,
                other => match other.parse::<PresetId>() {
                    Ok(id) => Some(id),
                    Err(e) => fail(format_args!("invalid preset id '{other}': {e}")),
                },
            };
            mgr.select(id)?;
        }
        PresetAction::Rename { id, name } => mgr.rename(id, &name)?,
        PresetAction::Show { id } => match mgr.store().get(id) {
            Some(preset) => print_json(preset),
            None => return Err(StoreError::UnknownPreset(id)),
        },
        PresetAction::Players { id } => {
            let preset = mgr.store().get(id).ok_or(StoreError::UnknownPreset(id))?;
            for player in &preset.players {
                println!("{}", player_label(data, player));
            }
        }
        PresetAction::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let preset: Preset = serde_json::from_str(&text)?;
            let id = mgr.update(|store| Ok(store.insert(preset)))?;
            println!("{id}");
        }
        PresetAction::Edit(args) => edit_preset(mgr, data, args)?,
    }
    Ok(())
}

fn edit_preset(
    mgr: &mut PresetManager<JsonFileRepository>,
    data: &dyn GameData,
    args: EditArgs,
) -> Result<(), StoreError> {
    let id = args.id;
    mgr.update(|store| {
        let p = store.get_mut(id).ok_or(StoreError::UnknownPreset(id))?;

        if let Some(mode) = args.mode {
            p.duties_mode = match mode {
                ModeArg::Whitelist => ListMode::Whitelist,
                ModeArg::Blacklist => ListMode::Blacklist,
            };
        }
        if args.clear_duties {
            p.clear_duties();
        }
        for duty in &args.add_duty {
            p.add_known_duty(data, *duty)?;
        }
        for duty in &args.remove_duty {
            p.remove_duty(*duty);
        }
        if let Some(level) = args.min_ilvl {
            p.set_min_item_level(level);
        }
        if let Some(level) = args.max_ilvl {
            p.set_max_item_level(level);
        }
        if let Some(allow) = args.allow_huge_ilvl {
            p.allow_huge_item_level = allow;
        }
        for label in &args.toggle_category {
            p.toggle_category(parse_category(label));
        }

        if args.clear_wanted {
            p.jobs.clear();
        }
        for group in &args.want {
            let idx = p.add_job_group();
            for name in group.split(',') {
                p.set_group_job(idx, parse_job(name), true);
            }
        }
        if args.clear_limit {
            p.clear_jobs_limit();
        }
        for name in &args.limit_job {
            p.set_jobs_limit_job(parse_job(name), true);
        }

        for (kind, terms) in [
            (TermKind::Required, &args.require),
            (TermKind::Highlight, &args.highlight),
            (TermKind::Exclude, &args.exclude),
        ] {
            for term in terms {
                p.add_term(kind, term)?;
            }
        }
        for arg in &args.block_player {
            let (name, world) = parse_player(arg);
            p.add_player(name, world)?;
        }
        Ok(())
    })
}

fn run_settings(
    mgr: &mut PresetManager<JsonFileRepository>,
    args: SettingsArgs,
) -> Result<(), StoreError> {
    let changed = args.show_when_host_ui_open.is_some()
        || args.window_side.is_some()
        || args.show_description_on_join.is_some()
        || args.always_one_player_per_job.is_some();
    if changed {
        mgr.update_settings(|s| {
            if let Some(v) = args.show_when_host_ui_open {
                s.show_when_host_ui_open = v;
            }
            if let Some(side) = args.window_side {
                s.window_side = match side {
                    SideArg::Left => WindowSide::Left,
                    SideArg::Right => WindowSide::Right,
                };
            }
            if let Some(v) = args.show_description_on_join {
                s.show_description_on_join = v;
            }
            if let Some(v) = args.always_one_player_per_job {
                s.always_one_player_per_job = v;
            }
        })?;
    }
    print_json(&mgr.store().settings);
    Ok(())
}

async fn run_filter(
    mgr: &PresetManager<JsonFileRepository>,
    data: StaticGameData,
    input: Option<PathBuf>,
) {
    let max_item_level = compute_max_item_level(&data);
    let filter = mgr.active_filter(max_item_level);
    if !filter.is_active() {
        warn!("no preset selected, every listing will be shown");
    }

    let (tx, rx) = mpsc::channel(256);
    let mut feed = match ListingFeedBuilder::new()
        .source(rx)
        .game_data(Arc::new(data))
        .filter(filter)
        .sink(Arc::new(TracingSink))
        .show_description_on_join(mgr.store().settings.show_description_on_join)
        .build()
    {
        Ok(feed) => feed,
        Err(e) => fail(format_args!("failed to build feed: {e}")),
    };

    let reader = tokio::spawn(async move {
        match input {
            Some(path) => match tokio::fs::File::open(&path).await {
                Ok(file) => read_events(file, tx).await,
                Err(e) => fail(format_args!("cannot read {}: {e}", path.display())),
            },
            None => read_events(tokio::io::stdin(), tx).await,
        }
    });

    loop {
        tokio::select! {
            verdict = feed.next_verdict() => {
                match verdict {
                    Some(v) => match serde_json::to_string(&v) {
                        Ok(json) => println!("{json}"),
                        Err(e) => warn!(error = %e, "JSON serialization failed"),
                    },
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down...");
                feed.shutdown();
                while let Some(v) = feed.next_verdict().await {
                    if let Ok(json) = serde_json::to_string(&v) {
                        println!("{json}");
                    }
                }
                break;
            }
        }
    }

    reader.abort();
    let m = feed.metrics();
    info!(
        received = m.listings_received,
        shown = m.listings_shown,
        hidden = m.listings_hidden,
        highlights = m.highlights_sent,
        "filter finished"
    );
}

/// Forwards one event per non-empty line. Malformed lines are skipped.
async fn read_events<R: AsyncRead + Unpin>(input: R, tx: mpsc::Sender<ListingEvent>) {
    let mut lines = BufReader::new(input).lines();
    let mut line_no = 0usize;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read input");
                break;
            }
        };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ListingEvent>(&line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!(line = line_no, error = %e, "skipping malformed event"),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Command::DumpDefaultPreset = cli.command {
        print_json(&Preset::create());
        return;
    }

    let data = load_game_data(cli.game_data.as_deref());

    match &cli.command {
        Command::Duties { query } => {
            for d in searchable_duties(&data, query.as_deref().unwrap_or("")) {
                println!("{:>6}  {}", d.row_id, d.display_name);
            }
            return;
        }
        Command::Worlds { home_world } => {
            for w in worlds_on_data_centre(&data, *home_world) {
                println!("{:>6}  {}", w.row_id, w.name);
            }
            return;
        }
        _ => {}
    }

    let repo = JsonFileRepository::new(&cli.store);
    let mut mgr = match PresetManager::load(repo) {
        Ok(mgr) => mgr,
        Err(e) => {
            let path = cli.store.display();
            fail(format_args!("cannot load preset store {path}: {e}"))
        }
    };

    let result = match cli.command {
        Command::Preset { action } => run_preset(&mut mgr, &data, action),
        Command::Settings(args) => run_settings(&mut mgr, args),
        Command::Filter { input } => {
            run_filter(&mgr, data, input).await;
            Ok(())
        }
        Command::Duties { .. } | Command::Worlds { .. } | Command::DumpDefaultPreset => Ok(()),
    };

    if let Err(e) = result {
        fail(e);
    }
}
