use std::path::PathBuf;

use anyhow::{Result, anyhow};

use arena_terminal::data_source::DataSource;
use arena_terminal::i18n::Locale;
use arena_terminal::query::{SortDir, SortKey};
use arena_terminal::state::{
    AppState, Command, Delta, Health, MatrixPayload, Snapshot, Theme, apply_command, apply_delta,
};

#[derive(Debug, Default)]
struct Args {
    data: Option<PathBuf>,
    search: Option<String>,
    sort: Option<SortKey>,
    dir: Option<SortDir>,
    width: Option<u32>,
    lang: Option<Locale>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args(std::env::args().skip(1).collect())?;
    let source = match args.data {
        Some(dir) => DataSource::Dir(dir),
        None => DataSource::from_env(),
    };

    let mut state = AppState::with_viewport(
        args.width.unwrap_or(arena_terminal::state::DEFAULT_VIEWPORT_WIDTH),
        args.lang.unwrap_or(Locale::Zh),
        Theme::Light,
    );
    load_into(&mut state, &source);

    if let Some(search) = args.search {
        apply_command(&mut state, Command::SearchChanged(search));
    }
    if let Some(key) = args.sort
        && key != state.query.sort_key
    {
        apply_command(&mut state, Command::SortRequested(key));
    }
    if let Some(dir) = args.dir
        && dir != state.query.sort_dir
    {
        let key = state.query.sort_key;
        apply_command(&mut state, Command::SortRequested(key));
    }

    for line in &state.logs {
        eprintln!("{line}");
    }
    println!("{}", serde_json::to_string_pretty(&state.presentation())?);
    Ok(())
}

// Same fallbacks as the interactive loader, run sequentially.
fn load_into(state: &mut AppState, source: &DataSource) {
    let current = source.load_current().unwrap_or_else(|err| {
        apply_delta(state, Delta::Log(format!("[WARN] Leaderboard load failed: {err:#}")));
        Snapshot::empty()
    });
    apply_delta(state, Delta::SetCurrent(current));
    let previous = source.load_previous().unwrap_or_default();
    apply_delta(state, Delta::SetPrevious(previous));
    let health = source
        .load_health()
        .unwrap_or_else(|err| Health::unavailable(format!("{err:#}")));
    apply_delta(state, Delta::SetHealth(health));
    let matrices = source.load_matrices().unwrap_or_else(|err| {
        apply_delta(state, Delta::Log(format!("[WARN] Heatmap load failed: {err:#}")));
        MatrixPayload::default()
    });
    apply_delta(state, Delta::SetMatrices(matrices));
}

fn parse_args(raw: Vec<String>) -> Result<Args> {
    let mut args = Args::default();
    let mut iter = raw.into_iter();
    while let Some(flag) = iter.next() {
        let (name, inline) = match flag.split_once('=') {
            Some((name, value)) => (name.to_string(), Some(value.to_string())),
            None => (flag, None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| iter.next())
                .ok_or_else(|| anyhow!("missing value for {name}"))
        };
        match name.as_str() {
            "--data" => args.data = Some(PathBuf::from(value()?)),
            "--search" => args.search = Some(value()?),
            "--sort" => {
                let raw = value()?;
                args.sort =
                    Some(SortKey::parse(&raw).ok_or_else(|| anyhow!("unknown sort key: {raw}"))?);
            }
            "--dir" => {
                let raw = value()?;
                args.dir =
                    Some(SortDir::parse(&raw).ok_or_else(|| anyhow!("unknown direction: {raw}"))?);
            }
            "--width" => {
                let raw = value()?;
                args.width = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| anyhow!("invalid width: {raw}"))?,
                );
            }
            "--lang" => {
                let raw = value()?;
                args.lang =
                    Some(Locale::parse(&raw).ok_or_else(|| anyhow!("unknown language: {raw}"))?);
            }
            other => return Err(anyhow!("unknown argument: {other}")),
        }
    }
    Ok(args)
}
