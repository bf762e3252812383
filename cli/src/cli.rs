use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[clap(name = "booker", version, about = "Facility slot booking automation")]
pub struct Cli {
    /// Show the browser window
    #[clap(long, global = true)]
    pub headful: bool,

    /// Emit JSON logs
    #[clap(long, global = true)]
    pub json_logs: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Keep trying to claim one slot until interrupted
    Run(RunArgs),
    /// Print your existing reservations
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct Credentials {
    #[clap(long)]
    pub user: String,

    #[clap(long, env = "BOOKER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[clap(flatten)]
    pub credentials: Credentials,

    /// Space number as used by the site
    #[clap(long)]
    pub space: String,

    /// Day to book (YYYY-MM-DD)
    #[clap(long)]
    pub date: NaiveDate,

    /// Start time exactly as the site lists it (HH:MM)
    #[clap(long, value_parser = parse_time)]
    pub time: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[clap(flatten)]
    pub credentials: Credentials,

    /// Re-scrape instead of serving the cached list
    #[clap(long)]
    pub refresh: bool,
}

impl Cli {
    /// Flags win over environment settings.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if self.headful {
            cfg.headless = false;
        }
        if self.json_logs {
            cfg.json_logs = true;
        }
    }
}

fn parse_time(s: &str) -> Result<String, String> {
    let s = s.trim();
    chrono::NaiveTime::parse_from_str(s, "%H:%M")
        .map(|_| s.to_string())
        .map_err(|_| format!("`{s}` is not an HH:MM time"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_command() {
        let cli = Cli::try_parse_from([
            "booker", "run", "--user", "u1", "--password", "pw", "--space", "57", "--date",
            "2026-05-01", "--time", "10:00",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.credentials.user, "u1");
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
        assert_eq!(args.time, "10:00");
    }

    #[test]
    fn rejects_malformed_time() {
        let res = Cli::try_parse_from([
            "booker", "run", "--user", "u1", "--password", "pw", "--space", "57", "--date",
            "2026-05-01", "--time", "10시",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "booker", "list", "--user", "u1", "--password", "pw", "--refresh", "--headful",
        ])
        .unwrap();

        let mut cfg = AppConfig::from_env();
        cfg.headless = true;
        cli.apply(&mut cfg);
        assert!(!cfg.headless);
        assert!(matches!(cli.command, Command::List(ListArgs { refresh: true, .. })));
    }
}
