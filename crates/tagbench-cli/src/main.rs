//! `tagbench` command line

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tagbench_annotation::tokenize_text;
use tagbench_core::{AnnotationSession, TagbenchConfig};
use tracing_subscriber::EnvFilter;

mod repl;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("TOML configuration file")
}

fn cli() -> Command {
    Command::new("tagbench")
        .version(tagbench_core::VERSION)
        .about("Sentence-level part-of-speech annotation workbench")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Raise log level (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("annotate")
                .about("Annotate sentences from the corpus service")
                .arg(config_arg())
                .arg(
                    Arg::new("api-base")
                        .long("api-base")
                        .help("Corpus service base URL"),
                )
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .value_parser(value_parser!(usize))
                        .help("Sentences fetched per page"),
                ),
        )
        .subcommand(
            Command::new("tokenize")
                .about("Print the tokens of TEXT, one per line")
                .arg(Arg::new("text").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("taxonomy")
                .about("Print the configured tag taxonomy")
                .arg(config_arg()),
        )
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (or defaults) with command line overrides applied
fn load_config(args: &ArgMatches) -> anyhow::Result<TagbenchConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => TagbenchConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TagbenchConfig::default(),
    };

    if let Ok(Some(api_base)) = args.try_get_one::<String>("api-base") {
        config = config.with_api_base(api_base.clone());
    }
    if let Ok(Some(page_size)) = args.try_get_one::<usize>("page-size") {
        config = config.with_page_size(*page_size);
    }
    config.validate()?;
    Ok(config)
}

async fn annotate(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let mut session = AnnotationSession::connect(config)?;

    if let Err(err) = session.start().await {
        tracing::warn!(%err, "initial load failed");
        println!("error: {err}; use 'reload' to retry");
    }
    repl::run(session).await
}

fn taxonomy(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    for (category, codes) in config.taxonomy.iter() {
        let codes: Vec<&str> = codes.iter().map(|code| code.as_str()).collect();
        println!("{category}: {}", codes.join(" "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("annotate", args)) => annotate(args).await,
        Some(("tokenize", args)) => {
            let text = args
                .get_many::<String>("text")
                .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            for token in tokenize_text(&text) {
                println!("{token}");
            }
            Ok(())
        }
        Some(("taxonomy", args)) => taxonomy(args),
        _ => Ok(()),
    }
}
