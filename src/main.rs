use clap::Parser;
use locanote::cli::{Cli, Commands};
use locanote::commands;
use locanote::config::Config;
use locanote::notes::NoteSummary;
use locanote::search::{NoteLookup, SearchOptions};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout carries command output and the MCP transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let dir = cli.dir.as_deref();

    match cli.command {
        Some(Commands::Search {
            query,
            limit,
            min_relevance,
            content,
            json,
        }) => {
            let engine = commands::load_engine(&config, dir)?;
            let defaults = config.search_options();
            let options = SearchOptions {
                limit: limit.unwrap_or(defaults.limit),
                min_relevance: min_relevance.unwrap_or(defaults.min_relevance),
                include_content: content,
            };
            let results = engine.search(&query, &options);

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("{}", commands::render_search(&query, &results));
            }
            Ok(())
        }
        Some(Commands::Get { name, json }) => {
            let engine = commands::load_engine(&config, dir)?;
            let lookup = engine.lookup(&name);

            if let NoteLookup::Ambiguous(_) = lookup {
                anyhow::bail!("{}", commands::render_lookup(&name, &lookup));
            }

            if json {
                let card = match &lookup {
                    NoteLookup::Found(note) => Some(NoteSummary::from_note(note)),
                    _ => None,
                };
                println!("{}", serde_json::to_string_pretty(&card)?);
            } else {
                println!("{}", commands::render_lookup(&name, &lookup));
            }
            Ok(())
        }
        Some(Commands::List { json }) => {
            let engine = commands::load_engine(&config, dir)?;
            let listing = commands::listing(&engine);

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("{}", commands::render_listing(&listing));
            }
            Ok(())
        }
        Some(Commands::Stats { json }) => {
            let engine = commands::load_engine(&config, dir)?;
            let report = commands::stats_report(&engine);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", commands::render_stats(&report));
            }
            Ok(())
        }
        Some(Commands::Tag { tag, json }) => {
            let engine = commands::load_engine(&config, dir)?;
            let notes = engine.notes_by_tag(&tag);

            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                println!("{}", commands::render_tag(&tag, &notes));
            }
            Ok(())
        }
        #[cfg(feature = "mcp")]
        Some(Commands::Serve) => {
            let engine = commands::open_engine(&config, dir)?;
            tokio::runtime::Runtime::new()?.block_on(locanote::mcp::serve(engine, config.search_options()))
        }
        None => {
            Cli::parse_from(["locanote", "--help"]);
            Ok(())
        }
    }
}
