use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use guard_cli::{
    collect_records, init_tracing, load_project, render_policies, render_policies_json,
    render_report, render_report_json, LoadOptions,
};
use guard_core::config::DEBUG_ENV_VAR;
use guard_core::{BatchCoordinator, TracingSink};
use guard_probe::GmIdentifyProbe;
use std::path::PathBuf;
use std::sync::Arc;

fn cli() -> Command {
    let project = Arg::new("project")
        .default_value(".")
        .value_parser(value_parser!(PathBuf))
        .help("Project root");
    let config = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Configuration file instead of <project>/asset-guard.toml");
    let legacy = Arg::new("legacy-policies")
        .long("legacy-policies")
        .action(ArgAction::SetTrue)
        .help("Use the earliest policy table (size and dimension bounds only)");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("asset-guard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate build assets and prepare a fix script")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("check")
                .about("Check every asset of a project")
                .arg(project.clone())
                .arg(config.clone())
                .arg(
                    Arg::new("debug")
                        .long("debug")
                        .action(ArgAction::SetTrue)
                        .help("Development build: skip all checks"),
                )
                .arg(legacy.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("policies")
                .about("Print the effective policy table")
                .arg(project)
                .arg(config)
                .arg(legacy)
                .arg(json),
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("check", args)) => {
            let project = args.get_one::<PathBuf>("project").cloned().unwrap_or_default();
            let options = LoadOptions {
                config_path: args.get_one::<PathBuf>("config").cloned(),
                debug: args.get_flag("debug"),
                legacy_policies: args.get_flag("legacy-policies"),
            };
            let env_debug = std::env::var(DEBUG_ENV_VAR).ok();
            let (config, table) = load_project(&project, &options, env_debug.as_deref())?;

            let records = if config.debug {
                Vec::new()
            } else {
                collect_records(&config.asset_root())
            };
            let probe = Arc::new(GmIdentifyProbe::new(config.probe_program.clone()));
            let mut batch = BatchCoordinator::new(config, table, probe, Arc::new(TracingSink));
            for record in records {
                batch.accept(record);
            }
            let report = batch.finish().await;

            if args.get_flag("json") {
                println!("{}", render_report_json(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
        Some(("policies", args)) => {
            let project = args.get_one::<PathBuf>("project").cloned().unwrap_or_default();
            let options = LoadOptions {
                config_path: args.get_one::<PathBuf>("config").cloned(),
                debug: false,
                legacy_policies: args.get_flag("legacy-policies"),
            };
            let (_, table) = load_project(&project, &options, None)?;

            if args.get_flag("json") {
                println!("{}", render_policies_json(&table)?);
            } else {
                print!("{}", render_policies(&table)?);
            }
        }
        _ => {}
    }

    Ok(())
}
