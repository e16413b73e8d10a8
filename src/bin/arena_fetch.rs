use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;

use arena_terminal::data_source::{self, LEADERBOARD_FILE};
use arena_terminal::refresh::{self, Target};

const EXIT_CONFIG: u8 = 1;
const EXIT_FETCH: u8 = 2;
const EXIT_HEALTH: u8 = 3;

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let arg = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let Some(targets) = Target::parse_list(&arg) else {
        eprintln!("usage: arena_fetch [leaderboard|health|heatmap|prompts|all]");
        return ExitCode::from(EXIT_CONFIG);
    };

    let base = std::env::var("ARENA_API_BASE").unwrap_or_default();
    if base.trim().is_empty() {
        eprintln!("Missing ARENA_API_BASE");
        return ExitCode::from(EXIT_CONFIG);
    }
    let dir = data_source::data_dir_from_env();

    let mut code = 0u8;
    for target in targets {
        let result = match target {
            Target::Health => fetch_health(&base, &dir),
            _ => fetch_document(&base, &dir, target).map_err(|err| (EXIT_FETCH, err)),
        };
        if let Err((exit, err)) = result {
            eprintln!("{}: {err:#}", target.file_name());
            code = code.max(exit);
        }
    }
    ExitCode::from(code)
}

fn fetch_document(base: &str, dir: &Path, target: Target) -> Result<()> {
    let payload = refresh::fetch_payload(base, target)?;
    let now = Utc::now();
    let doc = match target {
        Target::Leaderboard => refresh::leaderboard_document(&payload, now),
        Target::Heatmap => refresh::heatmap_document(&payload, now),
        Target::Prompts => refresh::prompts_document(&payload, now),
        Target::Health => refresh::health_document(&payload, now),
    };
    if target == Target::Leaderboard && refresh::rotate_previous(dir)? {
        println!("Rotated previous {LEADERBOARD_FILE}");
    }
    let path = refresh::write_document(dir, target.file_name(), &doc)
        .with_context(|| format!("saving {}", target.file_name()))?;
    match doc.get("leaderboard").and_then(|v| v.as_array()) {
        Some(rows) => println!("Wrote {} ({} rows)", path.display(), rows.len()),
        None => println!("Wrote {}", path.display()),
    }
    Ok(())
}

// A failed health check is still written, as an error state the viewer shows.
fn fetch_health(base: &str, dir: &Path) -> std::result::Result<(), (u8, anyhow::Error)> {
    let now = Utc::now();
    match refresh::fetch_payload(base, Target::Health) {
        Ok(payload) => {
            let doc = refresh::health_document(&payload, now);
            let path = refresh::write_document(dir, Target::Health.file_name(), &doc)
                .map_err(|err| (EXIT_FETCH, err))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Err(err) => {
            let doc = refresh::health_error_document(&format!("{err:#}"), now);
            refresh::write_document(dir, Target::Health.file_name(), &doc)
                .map_err(|write_err| (EXIT_FETCH, write_err))?;
            Err((EXIT_HEALTH, err))
        }
    }
}
