use std::str::FromStr;

use crate::dashboard::{Dashboard, Renderer};
use crate::formatter::SystemClock;
use crate::market::{MarketData, Period};
use crate::surface::{DisplaySurface, TabBar};
use crate::tui::{Component, DisabledComponents};

use clap::{arg, ArgMatches, Command};
use eyre::WrapErr;
use serde::Deserialize;
use serde::Serialize;

mod dashboard;
mod error;
mod formatter;
mod market;
mod report;
mod surface;
mod tui;

#[derive(Serialize, Deserialize)]
struct Config {
    default_period: String,
    data_file: String,
    disabled_components: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_period: "daily".to_string(),
            data_file: String::new(),
            disabled_components: Vec::new(),
        }
    }
}

fn cli() -> Command {
    Command::new("market_snapshot")
        .about("Daily, weekly and monthly market snapshots in your terminal")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(
            Command::new("tui")
                .about("Open the interactive dashboard")
                .arg(
                    arg!(-p --period <PERIOD> "Period shown at startup (daily, weekly, monthly)")
                        .required(false)
                        .value_parser(Period::from_str),
                )
                .arg(arg!(-d --data <FILE> "JSON file with market data").required(false)),
        )
        .subcommand(
            Command::new("show")
                .about("Print the snapshot of a period")
                .arg(
                    arg!([PERIOD] "Period to print (daily, weekly, monthly)")
                        .value_parser(Period::from_str),
                )
                .arg(arg!(-d --data <FILE> "JSON file with market data").required(false))
                .arg(arg!(--json "Print the raw period record as JSON")),
        )
}

// The dashboard shares the terminal with stderr, so it stays at warn even in
// debug builds. RUST_LOG overrides both levels.
fn log_levels(interactive: bool) -> (log::LevelFilter, log::LevelFilter) {
    if cfg!(debug_assertions) && !interactive {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Warn, log::LevelFilter::Warn)
    }
}

fn init_logging(interactive: bool) {
    let (global_level, my_code_level) = log_levels(interactive);

    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("market_snapshot"), my_code_level)
        .parse_env("RUST_LOG")
        .init();
}

// --data wins over the config file, an empty path means the embedded sample data
fn load_market_data(matches: &ArgMatches, cfg: &Config) -> eyre::Result<MarketData> {
    let mut filename = String::new();
    if let Ok(Some(f)) = matches.try_get_one::<String>("data") {
        filename = f.to_string();
    }
    if filename.is_empty() {
        filename.clone_from(&cfg.data_file);
    }

    if filename.is_empty() {
        Ok(MarketData::embedded()?)
    } else {
        log::info!("Loading market data from {filename}");
        MarketData::from_file(&filename)
            .wrap_err_with(|| format!("failed to load market data from {filename}"))
    }
}

fn resolve_period(matches: &ArgMatches, name: &str, cfg: &Config) -> eyre::Result<Period> {
    if let Ok(Some(period)) = matches.try_get_one::<Period>(name) {
        return Ok(*period);
    }
    Period::from_str(&cfg.default_period).map_err(|e| eyre::eyre!("invalid config: {e}"))
}

fn main() -> eyre::Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.subcommand_name() == Some("tui"));

    let cfg: Config =
        confy::load("market_snapshot", "config").wrap_err("failed to load configuration")?;

    match matches.subcommand() {
        Some(("config", _)) => {
            let path = confy::get_configuration_file_path("market_snapshot", "config")?;
            println!("Your config file is located here: \n{}", path.display());
            println!("\nComponents that can be listed under disabled_components:");
            for component in Component::all() {
                println!("  {:<10} {}", component.as_str(), component.description());
            }
        }
        Some(("tui", sub)) => {
            let data = load_market_data(sub, &cfg)?;
            let period = resolve_period(sub, "period", &cfg)?;
            let dashboard = Dashboard::bootstrap(
                data,
                DisplaySurface::dashboard(),
                TabBar::new(),
                SystemClock,
                period,
            )?;
            log::debug!(
                "Periods available: {:?}",
                dashboard.data().periods().collect::<Vec<_>>()
            );
            let disabled = DisabledComponents::new(&cfg.disabled_components);
            tui::run_tui(dashboard, disabled).map_err(|e| eyre::eyre!("{e}"))?;
        }
        Some(("show", sub)) => {
            let data = load_market_data(sub, &cfg)?;
            let period = resolve_period(sub, "PERIOD", &cfg)?;

            if sub.get_flag("json") {
                println!("{}", report::export_json(&data, period)?);
            } else {
                let renderer = Renderer::new(data, SystemClock);
                let mut surface = DisplaySurface::dashboard();
                renderer.render(period, &mut surface)?;
                report::print_snapshot(&surface);
            }
        }
        _ => (),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli() {
        let matches = cli().get_matches_from(vec!["market_snapshot", "show", "weekly"]);
        assert_eq!(matches.subcommand_name(), Some("show"));
        let sub = matches.subcommand_matches("show").unwrap();
        assert_eq!(sub.get_one::<Period>("PERIOD"), Some(&Period::Weekly));
        assert!(!sub.get_flag("json"));
    }

    #[test]
    fn test_cli_rejects_unknown_period() {
        let result = cli().try_get_matches_from(vec!["market_snapshot", "show", "yearly"]);
        assert!(result.is_err());
        let result =
            cli().try_get_matches_from(vec!["market_snapshot", "tui", "--period", "hourly"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_period_falls_back_to_config() {
        let cfg = Config {
            default_period: "monthly".to_string(),
            ..Config::default()
        };
        let matches = cli().get_matches_from(vec!["market_snapshot", "tui"]);
        let sub = matches.subcommand_matches("tui").unwrap();
        assert_eq!(resolve_period(sub, "period", &cfg).unwrap(), Period::Monthly);

        let matches = cli().get_matches_from(vec!["market_snapshot", "tui", "-p", "weekly"]);
        let sub = matches.subcommand_matches("tui").unwrap();
        assert_eq!(resolve_period(sub, "period", &cfg).unwrap(), Period::Weekly);
    }

    #[test]
    fn test_default_config_uses_embedded_daily() {
        let cfg = Config::default();
        let matches = cli().get_matches_from(vec!["market_snapshot", "show"]);
        let sub = matches.subcommand_matches("show").unwrap();
        assert_eq!(resolve_period(sub, "PERIOD", &cfg).unwrap(), Period::Daily);
        let data = load_market_data(sub, &cfg).unwrap();
        assert_eq!(data, MarketData::embedded().unwrap());
    }

    #[test]
    fn test_log_levels() {
        use log::LevelFilter;

        assert_eq!(log_levels(true), (LevelFilter::Warn, LevelFilter::Warn));
        let expected = if cfg!(debug_assertions) {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        };
        assert_eq!(log_levels(false), (LevelFilter::Warn, expected));
    }

    #[test]
    fn test_load_market_data_missing_file() {
        let cfg = Config {
            data_file: "/nonexistent/market.json".to_string(),
            ..Config::default()
        };
        let matches = cli().get_matches_from(vec!["market_snapshot", "show"]);
        let sub = matches.subcommand_matches("show").unwrap();
        assert!(load_market_data(sub, &cfg).is_err());
    }
}
