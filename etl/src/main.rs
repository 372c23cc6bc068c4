use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use common::config::Settings;
use config::Value;
use etl::utils::InterruptFlag;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("JSONL Archive ETL")
        .version("1.0")
        .about("Converts newline-delimited post archives into CSV tables")
        .subcommand(
            Command::new("ingest")
                .about("Convert every matching file under an input directory")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom config file"),
                )
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("DIR")
                        .help("Root directory searched recursively for source files"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Output CSV (fan-in) or output root directory (mirrored)"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_parser(["fan-in", "mirrored"])
                        .help("One combined table or one table per source file"),
                )
                .arg(
                    Arg::new("accumulation")
                        .long("accumulation")
                        .value_parser(["stream", "memory"])
                        .help("Fan-in only: stream rows to disk or buffer them until the end"),
                )
                .arg(Arg::new("suffix").long("suffix").help("Source file suffix [default: .jsonl]"))
                .arg(
                    Arg::new("output-suffix")
                        .long("output-suffix")
                        .help("Suffix of mirrored output files [default: .csv]"),
                )
                .arg(
                    Arg::new("columns")
                        .long("columns")
                        .value_delimiter(',')
                        .help("Column order: default, text-first, or a comma separated list"),
                )
                .arg(
                    Arg::new("batch-size")
                        .long("batch-size")
                        .value_parser(clap::value_parser!(i64).range(0..))
                        .help("Flush output every N rows"),
                )
                .arg(
                    Arg::new("quote-all")
                        .long("quote-all")
                        .action(ArgAction::SetTrue)
                        .help("Quote every field"),
                )
                .arg(
                    Arg::new("no-progress")
                        .long("no-progress")
                        .action(ArgAction::SetTrue)
                        .help("Hide the progress bar"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_name("FILE")
                        .help("Also write the job report as JSON"),
                )
                .arg(
                    Arg::new("log-json")
                        .long("log-json")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn overrides(matches: &ArgMatches) -> Vec<(&'static str, Value)> {
    let mut overrides = Vec::new();

    for (arg, key) in [
        ("input", "input_root"),
        ("output", "output"),
        ("mode", "layout"),
        ("accumulation", "accumulation"),
        ("suffix", "suffix"),
        ("output-suffix", "output_suffix"),
        ("report", "report_path"),
    ] {
        if let Some(value) = matches.get_one::<String>(arg) {
            overrides.push((key, Value::from(value.as_str())));
        }
    }

    if let Some(columns) = matches.get_many::<String>("columns") {
        let columns: Vec<String> = columns.cloned().collect();
        overrides.push(("columns", Value::from(columns)));
    }
    if let Some(batch_size) = matches.get_one::<i64>("batch-size") {
        overrides.push(("flush_interval", Value::from(*batch_size)));
    }
    if matches.get_flag("quote-all") {
        overrides.push(("quote_all", Value::from(true)));
    }
    if matches.get_flag("no-progress") {
        overrides.push(("progress", Value::from(false)));
    }

    overrides
}

async fn ingest(matches: &ArgMatches) -> anyhow::Result<i32> {
    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let settings =
        Settings::load(config_path, overrides(matches)).context("Failed to load settings")?;

    let flag = InterruptFlag::new();
    let handler_flag = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, flushing rows converted so far");
            handler_flag.raise();
        }
        // a second Ctrl-C skips the flush
        if tokio::signal::ctrl_c().await.is_ok() {
            process::exit(130);
        }
    });

    let report = tokio::task::spawn_blocking(move || etl::run_etl_pipeline(&settings, &flag))
        .await
        .context("Conversion task panicked")?
        .context("Conversion failed")?;

    println!("{}", report);
    Ok(report.outcome.exit_code())
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("ingest", ingest_matches)) => {
            init_tracing(ingest_matches.get_flag("log-json"));

            match ingest(ingest_matches).await {
                Ok(code) => process::exit(code),
                Err(e) => {
                    eprintln!("ETL pipeline error: {:#}", e);
                    process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let matches = cli().get_matches_from([
            "jsonl-etl",
            "ingest",
            "-i",
            "/archive",
            "-o",
            "/out",
            "--mode",
            "mirrored",
            "--columns",
            "text,likes,retweets,replies,created_at,reply_settings",
            "--batch-size",
            "500",
            "--no-progress",
        ]);
        let (_, ingest_matches) = matches.subcommand().unwrap();

        let settings = Settings::load(None, overrides(ingest_matches)).unwrap();
        assert_eq!(settings.input_root, std::path::PathBuf::from("/archive"));
        assert_eq!(settings.layout, common::config::LayoutMode::Mirrored);
        assert_eq!(settings.columns.len(), 6);
        assert_eq!(settings.columns[0], "text");
        assert_eq!(settings.flush_interval, 500);
        assert!(!settings.progress);
    }

    #[test]
    fn test_cli_verifies() {
        cli().debug_assert();
    }
}
