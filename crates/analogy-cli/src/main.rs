use analogy_agents::{AgentSet, AzureOpenAiBackend, DomainSuggester};
use analogy_core::{Capabilities, EngineConfig, Pipeline, PipelineOptions};
use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod render;

fn cli() -> Command {
    Command::new("analogy-engine")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ontology-gated cross-domain analogy research")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file (default: ./analogy.toml if present)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("run")
                .about("Map a source-domain mechanism onto a target-domain problem")
                .arg(
                    Arg::new("source")
                        .long("source")
                        .required_unless_present("source-file")
                        .conflicts_with("source-file")
                        .help("Source-domain text (graph A)"),
                )
                .arg(
                    Arg::new("source-file")
                        .long("source-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Read the source-domain text from a file"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .required_unless_present("target-file")
                        .conflicts_with("target-file")
                        .help("Target-domain text (graph B)"),
                )
                .arg(
                    Arg::new("target-file")
                        .long("target-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Read the target-domain text from a file"),
                )
                .arg(
                    Arg::new("max-refinements")
                        .long("max-refinements")
                        .value_parser(value_parser!(usize))
                        .help("Refinement iterations after the first alignment (overrides config)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the full run as JSON"),
                ),
        )
        .subcommand(
            Command::new("suggest")
                .about("Suggest a far-removed source domain for a target problem")
                .arg(
                    Arg::new("problem")
                        .long("problem")
                        .required(true)
                        .help("Target problem statement"),
                ),
        )
        .subcommand(Command::new("ontology").about("Print the ontology rules the agents follow"))
}

fn init_tracing(verbosity: u8, json: bool) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn text_arg(args: &ArgMatches, inline: &str, file: &str) -> Result<String> {
    if let Some(text) = args.get_one::<String>(inline) {
        return Ok(text.clone());
    }
    match args.get_one::<PathBuf>(file) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => bail!("either --{inline} or --{file} is required"),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = EngineConfig::load(path).context("failed to load configuration")?;
    config.validate(true).context("invalid configuration")?;
    info!(path = ?path, deployment = %config.backend.deployment, "configuration loaded");
    Ok(config)
}

fn agents(config: &EngineConfig) -> Result<AgentSet> {
    let backend = AzureOpenAiBackend::from_config(&config.backend)
        .context("failed to initialise the reasoning backend")?;
    Ok(AgentSet::new(Arc::new(backend)))
}

async fn run(args: &ArgMatches, config: EngineConfig) -> Result<()> {
    let source = text_arg(args, "source", "source-file")?;
    let target = text_arg(args, "target", "target-file")?;
    let max_refinements = args
        .get_one::<usize>("max-refinements")
        .copied()
        .unwrap_or(config.pipeline.max_refinements);

    let options = PipelineOptions::try_from(&config.pipeline)?;
    let agents = agents(&config)?;
    let pipeline = Pipeline::new(Capabilities::from_agents(&agents), options);

    let run = pipeline
        .run_traced(&source, &target, max_refinements)
        .await
        .context("analogy pipeline failed")?;
    info!(run_id = %run.run_id, degraded = run.report.is_degraded(), "report ready");

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", render::report_text(&run.report));
    }
    Ok(())
}

async fn suggest(args: &ArgMatches, config: EngineConfig) -> Result<()> {
    let problem = args
        .get_one::<String>("problem")
        .context("--problem is required")?;
    let agents = agents(&config)?;
    let suggestion = agents
        .visionary
        .suggest(problem)
        .await
        .context("domain suggestion failed")?;
    println!("{suggestion}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"), matches.get_flag("log-json"));
    let config_path = matches.get_one::<PathBuf>("config").cloned();

    match matches.subcommand() {
        Some(("run", args)) => run(args, load_config(config_path.as_deref())?).await,
        Some(("suggest", args)) => suggest(args, load_config(config_path.as_deref())?).await,
        Some(("ontology", _)) => {
            println!("{}", analogy_ontology::ontology_full());
            Ok(())
        }
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn run_accepts_inline_texts() {
        let matches = cli()
            .try_get_matches_from([
                "analogy-engine",
                "run",
                "--source",
                "water in pipes",
                "--target",
                "current in wires",
                "--max-refinements",
                "3",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        assert_eq!(text_arg(args, "source", "source-file").unwrap(), "water in pipes");
        assert_eq!(args.get_one::<usize>("max-refinements"), Some(&3));
    }

    #[test]
    fn run_rejects_both_inline_and_file() {
        let result = cli().try_get_matches_from([
            "analogy-engine",
            "run",
            "--source",
            "a",
            "--source-file",
            "a.txt",
            "--target",
            "b",
        ]);
        assert!(result.is_err());
    }
}
