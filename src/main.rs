//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use league_analytics::{
    cli::{Commands, LeagueCli},
    commands::{
        awards::{handle_awards, AwardsParams},
        open_engine,
        opponents::handle_opponent_matrix,
        rebuild::{handle_import, handle_rebuild, season_selector},
        season::{handle_season_power, handle_standings, handle_team_history},
        week::{handle_season_zscores, handle_week_power, handle_week_zscores},
    },
};

/// Log to stderr so stdout stays clean for tables and JSON.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("league_analytics=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

fn run(app: LeagueCli) -> league_analytics::Result<()> {
    let engine = open_engine(app.db)?;

    match app.command {
        Commands::WeekPower { season, week, json } => {
            handle_week_power(&engine, season, week, json)?
        }

        Commands::WeekZscores { season, week, json } => {
            handle_week_zscores(&engine, season, week, json)?
        }

        Commands::SeasonZscores { season, json } => handle_season_zscores(&engine, season, json)?,

        Commands::Standings { season, json } => handle_standings(&engine, season, json)?,

        Commands::SeasonPower { season, json } => handle_season_power(&engine, season, json)?,

        Commands::TeamHistory {
            season,
            team_id,
            json,
        } => handle_team_history(&engine, season, team_id, json)?,

        Commands::OpponentMatrix {
            team_id,
            range,
            owner_era_only,
            json,
        } => handle_opponent_matrix(&engine, team_id, &range, owner_era_only, json)?,

        Commands::Awards {
            scope,
            mode,
            season,
            team_id,
            owner,
            owner_era_only,
            json,
        } => handle_awards(
            &engine,
            AwardsParams {
                scope,
                mode,
                season,
                team_id,
                owner,
                owner_era_only,
                as_json: json,
            },
        )?,

        Commands::Rebuild {
            kind,
            season,
            range,
            force,
            json,
        } => handle_rebuild(&engine, kind, season_selector(season, &range), force, json)?,

        Commands::Import {
            file,
            rebuild,
            json,
        } => handle_import(&engine, &file, rebuild, json)?,
    }

    Ok(())
}

/// Run the CLI.
fn main() {
    let app = LeagueCli::parse();

    if let Err(err) = init_tracing() {
        eprintln!("Warning: {err:#}");
    }

    if let Err(err) = run(app) {
        eprintln!("Error: {err}");
        let code = if err.is_validation() { 2 } else { 1 };
        std::process::exit(code);
    }
}
