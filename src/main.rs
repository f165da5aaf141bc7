use clap::Parser;
use kbrag::cli::{Cli, Commands};
use kbrag::commands;
use kbrag::config::Config;
use kbrag::engine::KnowledgeEngine;
use kbrag::search::RetrievalResult;
use kbrag::stats::KnowledgeStats;
use kbrag::store::KnowledgeEntry;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "kbrag=debug" } else { "kbrag=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        Cli::parse_from(["kbrag", "--help"]);
        return Ok(());
    };

    let config = Config::load()?;
    let knowledge_path = cli
        .knowledge
        .clone()
        .unwrap_or_else(|| config.knowledge_path());
    let open = || commands::open_engine(&config, cli.knowledge.as_deref(), cli.no_rag);

    match command {
        Commands::Search {
            query,
            limit,
            min_relevance,
        } => {
            let engine = open()?;
            let results = commands::search(&engine, &config.search, &query, limit, min_relevance)?;
            print_results(&engine, &query, &results);
        }
        Commands::Context { query } => {
            let engine = open()?;
            let context = commands::context(&engine, &query)?;
            if !context.is_empty() {
                println!("{context}");
            }
        }
        Commands::List { category } => {
            let engine = open()?;
            let entries = commands::list(&engine, category.as_deref());
            if entries.is_empty() {
                println!("No entries found.");
            }
            for entry in &entries {
                let category = entry.category.as_deref().unwrap_or("uncategorized");
                println!("{} [{category}]", entry.id);
            }
        }
        Commands::Get { id } => {
            let engine = open()?;
            print_entry(&commands::get(&engine, &id)?);
        }
        Commands::Categories => {
            let engine = open()?;
            let categories = engine.get_categories();
            if categories.is_empty() {
                println!("No categories available.");
            }
            for category in categories {
                println!("{category}");
            }
        }
        Commands::Stats => {
            let engine = open()?;
            print_stats(&engine.get_stats());
        }
        Commands::Check => {
            let stats = commands::check(&knowledge_path)?;
            println!(
                "OK: {} entries in {}",
                stats.total_entries,
                knowledge_path.display()
            );
        }
        Commands::Init { force } => {
            let path = commands::init(&knowledge_path, force)?;
            println!("Created {}", path.display());
        }
        #[cfg(feature = "mcp")]
        Commands::Serve => {
            let engine = open()?;
            tokio::runtime::Runtime::new()?
                .block_on(kbrag::mcp::serve(engine, config.search))?;
        }
    }

    Ok(())
}

fn print_results(engine: &KnowledgeEngine, query: &str, results: &[RetrievalResult]) {
    if !engine.is_enabled() {
        println!("Knowledge retrieval is disabled.");
        return;
    }

    if results.is_empty() {
        println!("No matches found for '{query}'");
        return;
    }

    for (position, result) in results.iter().enumerate() {
        println!("Result {}: {}", position + 1, result.entry_id);
        println!("  Relevance: {:.2}", result.relevance_score);
        println!(
            "  Keywords: {}",
            result
                .matched_keywords
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!(
            "  Category: {}",
            result.category.as_deref().unwrap_or("None")
        );
        println!("  {}", result.content);
        println!();
    }
    println!("{} result(s) found", results.len());
}

fn print_entry(entry: &KnowledgeEntry) {
    println!("Id: {}", entry.id);
    println!(
        "Category: {}",
        entry.category.as_deref().unwrap_or("None")
    );
    println!(
        "Keywords: {}",
        entry
            .keywords
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    for (key, value) in &entry.metadata {
        println!("Metadata {key}: {value}");
    }
    println!();
    println!("{}", entry.content);
}

fn print_stats(stats: &KnowledgeStats) {
    if !stats.enabled {
        println!("Knowledge retrieval is disabled.");
        return;
    }

    if let Some(ref source) = stats.source {
        println!("Knowledge file: {}", source.display());
    }
    println!("Total entries: {}", stats.total_entries);
    println!("Total keywords: {}", stats.total_keywords);
    println!(
        "Average keywords per entry: {:.2}",
        stats.average_keywords_per_entry
    );
    println!("Categories: {}", stats.categories.len());
    for (category, count) in &stats.categories {
        println!("  {category}: {count}");
    }
}
