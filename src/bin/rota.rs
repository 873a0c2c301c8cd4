//! CLI binary for u-rota.

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use u_rota::config::RotaConfig;
use u_rota::models::room_index;
use u_rota::scheduler::{DutyBalance, Rota, RotationStrategy};
use u_rota::state::StateStore;
use u_rota::validation::{MAX_WEEKS, MIN_WEEKS};
use u_rota::view::{balance_table, WeekView};

/// Household chore rotation.
#[derive(Parser)]
#[command(name = "rota", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured rotation strategy (tabulated, rotating).
    #[arg(short, long)]
    strategy: Option<RotationStrategy>,

    /// Pretend "now" is this date (YYYY-MM-DD) or instant (RFC 3339).
    #[arg(long, value_parser = parse_at)]
    at: Option<At>,

    /// Override the rotation state file.
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Show this week's and next week's duties.
    Show,

    /// List duties for consecutive weeks, starting with this one.
    Schedule {
        /// Number of weeks.
        #[arg(short, long, value_parser = parse_weeks)]
        weeks: Option<usize>,
    },

    /// Count turns per room over consecutive weeks.
    Stats {
        /// Number of weeks.
        #[arg(short, long, value_parser = parse_weeks)]
        weeks: Option<usize>,
    },

    /// Inspect or change the persisted rotation seed.
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

/// A `--at` override.
#[derive(Debug, Clone, Copy)]
enum At {
    /// Local calendar date.
    Date(NaiveDate),
    /// Exact instant.
    Instant(DateTime<Utc>),
}

impl At {
    /// Instant to resolve. Dates become local noon under the configured offset.
    fn resolve(self, utc_offset_hours: i32) -> DateTime<Utc> {
        match self {
            Self::Instant(instant) => instant,
            Self::Date(date) => {
                let shift = Duration::hours(12 - i64::from(utc_offset_hours));
                let midnight = date.and_time(NaiveTime::MIN).and_utc();
                midnight.checked_add_signed(shift).unwrap_or(if shift > Duration::zero() {
                    DateTime::<Utc>::MAX_UTC
                } else {
                    DateTime::<Utc>::MIN_UTC
                })
            }
        }
    }
}

#[derive(Subcommand)]
enum StateAction {
    /// Print the room that last had bathroom duty.
    Show,
    /// Record the room that last had bathroom duty.
    Set {
        /// Room identifier.
        room: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("u_rota=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RotaConfig::load(cli.config.as_deref())?;
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(path) = cli.state_file {
        config.state_path = Some(path);
    }
    let now = cli
        .at
        .map_or_else(Utc::now, |at| at.resolve(config.utc_offset_hours));

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => show(&config, now),
        Command::Schedule { weeks } => schedule(&config, now, weeks.unwrap_or(config.weeks)),
        Command::Stats { weeks } => stats(&config, now, weeks.unwrap_or(config.weeks)),
        Command::State { action } => state(&config, action),
    }
}

fn build(config: &RotaConfig) -> anyhow::Result<Rota> {
    config
        .open_rota()
        .with_context(|| format!("loading {} rota", config.strategy))
}

fn show(config: &RotaConfig, now: DateTime<Utc>) -> anyhow::Result<()> {
    let rota = build(config)?;
    let current = WeekView::new("Current Week", &rota.current_week(now), rota.rooms());
    let next = WeekView::new("Next Week", &rota.next_week(now), rota.rooms());
    println!("{current}\n{next}");
    Ok(())
}

fn schedule(config: &RotaConfig, now: DateTime<Utc>, weeks: usize) -> anyhow::Result<()> {
    let rota = build(config)?;
    let upcoming = rota.upcoming(now, weeks);
    for (offset, _) in upcoming.iter() {
        let week = rota.week_at(offset);
        let title = format!("Week {} ({}/{})", offset, week.cycle_index + 1, rota.cycle_length());
        println!("{}", WeekView::new(title, &week, rota.rooms()));
    }
    Ok(())
}

fn stats(config: &RotaConfig, now: DateTime<Utc>, weeks: usize) -> anyhow::Result<()> {
    let rota = build(config)?;
    let upcoming = rota.upcoming(now, weeks);
    print!("{}", balance_table(&DutyBalance::calculate(&upcoming, rota.rooms())));
    Ok(())
}

fn state(config: &RotaConfig, action: StateAction) -> anyhow::Result<()> {
    let store = StateStore::new(config.state_path());
    match action {
        StateAction::Show => match store.read()? {
            Some(record) => match record.last_bathroom_zimmer {
                Some(room) => println!("{room}"),
                None => println!("(unset)"),
            },
            None => println!("(no state file at {})", store.path().display()),
        },
        StateAction::Set { room } => {
            if room_index(&config.rooms, &room).is_none() {
                let known: Vec<&str> = config.rooms.iter().map(|r| r.id.as_str()).collect();
                anyhow::bail!("unknown room '{room}'; configured rooms: {}", known.join(", "));
            }
            store.set_last_bathroom(&room)?;
            println!("last bathroom room set to {room}");
        }
    }
    Ok(())
}

fn parse_weeks(s: &str) -> Result<usize, String> {
    let weeks: usize = s.parse().map_err(|e| format!("{e}"))?;
    if (MIN_WEEKS..=MAX_WEEKS).contains(&weeks) {
        Ok(weeks)
    } else {
        Err(format!("must be between {MIN_WEEKS} and {MAX_WEEKS}"))
    }
}

fn parse_at(s: &str) -> Result<At, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(At::Instant(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(At::Date)
        .map_err(|e| format!("expected YYYY-MM-DD or RFC 3339: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use u_rota::calendar::WeekResolver;

    fn household() -> RotaConfig {
        RotaConfig::default()
    }

    fn week_of(at: &str, config: &RotaConfig) -> i64 {
        let now = parse_at(at).unwrap().resolve(config.utc_offset_hours);
        WeekResolver::new(config.start_date, config.utc_offset_hours)
            .unwrap()
            .week_offset(now)
    }

    #[test]
    fn test_date_resolves_to_local_noon() {
        let at = parse_at("2023-12-10").unwrap();
        assert_eq!(at.resolve(1), Utc.with_ymd_and_hms(2023, 12, 10, 11, 0, 0).unwrap());
        assert_eq!(at.resolve(-5), Utc.with_ymd_and_hms(2023, 12, 10, 17, 0, 0).unwrap());
        assert_eq!(at.resolve(14), Utc.with_ymd_and_hms(2023, 12, 9, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_date_week_boundaries() {
        let config = household();
        assert_eq!(week_of("2023-12-10", &config), 0); // Sunday
        assert_eq!(week_of("2023-12-11", &config), 1); // Monday
        assert_eq!(week_of("2023-12-03", &config), -1);
    }

    #[test]
    fn test_dates_at_calendar_edges_do_not_panic() {
        let last = parse_at("262142-12-31").unwrap();
        assert!(last.resolve(-12) >= last.resolve(1));

        let rota = build(&household()).unwrap();
        let next = rota.next_week(last.resolve(1));
        assert!(next.span.monday <= next.span.sunday);
    }

    #[test]
    fn test_parse_at_instant() {
        let at = parse_at("2023-12-10T23:30:00+01:00").unwrap();
        assert_eq!(at.resolve(1), Utc.with_ymd_and_hms(2023, 12, 10, 22, 30, 0).unwrap());
        // The configured offset does not apply to explicit instants
        assert_eq!(at.resolve(-5), at.resolve(1));
    }

    #[test]
    fn test_parse_at_rejects_garbage() {
        assert!(parse_at("next tuesday").is_err());
        assert!(parse_at("2023-13-01").is_err());
    }

    #[test]
    fn test_parse_weeks_bounds() {
        assert_eq!(parse_weeks("1"), Ok(1));
        assert_eq!(parse_weeks("52"), Ok(52));
        assert!(parse_weeks("0").is_err());
        assert!(parse_weeks("53").is_err());
        assert!(parse_weeks("-3").is_err());
    }

    #[test]
    fn test_build_rotating_bootstraps_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = RotaConfig {
            strategy: RotationStrategy::Rotating,
            state_path: Some(dir.path().join("task_data.json")),
            ..household()
        };

        let rota = build(&config).unwrap();
        assert_eq!(rota.rotation().name(), "rotating");
        let record = StateStore::new(config.state_path()).read().unwrap().unwrap();
        assert_eq!(record.last_bathroom_zimmer.as_deref(), Some("Zimmer 2"));
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "rota",
            "--strategy",
            "rotating",
            "--at",
            "2024-01-01",
            "schedule",
            "--weeks",
            "8",
        ])
        .unwrap();
        assert_eq!(cli.strategy, Some(RotationStrategy::Rotating));
        assert!(matches!(cli.at, Some(At::Date(_))));
        assert!(matches!(cli.command, Some(Command::Schedule { weeks: Some(8) })));

        assert!(Cli::try_parse_from(["rota", "stats", "--weeks", "60"]).is_err());
    }
}
