use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use threadview::config::Config;
use threadview::logging;
use threadview::mail::{DirSource, ThreadSource, build, filter_thread, resolve, segment_all};

#[derive(Parser)]
#[command(name = "analyze_thread", about = "Print depth and active-path analysis of a thread")]
struct Cli {
    /// Thread ids to analyze (default: every thread under the root)
    thread_ids: Vec<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    root: Option<String>,
}

fn main() -> Result<()> {
    logging::init_stderr();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    let root = cli.root.unwrap_or_else(|| config.source.root.clone());
    let source = DirSource::new(&root);

    let ids = if cli.thread_ids.is_empty() {
        source.list_threads().context("listing threads")?
    } else {
        cli.thread_ids
    };

    for id in ids {
        let messages = source
            .fetch_thread(&id)
            .with_context(|| format!("loading thread {}", id))?;
        let messages = filter_thread(&messages, config.view.show_deleted);
        let graph = build(&messages);

        println!("Thread {}: {} messages, {} depth levels", id, graph.len(), graph.max_depth);

        let Some(active) = resolve(&graph, None) else {
            println!("  (empty)\n");
            continue;
        };
        let segments = segment_all(&graph);

        println!("  {:>3}  {:>5}  {:4}  {:>7}  id", "#", "depth", "path", "quoted");
        for (i, m) in graph.messages.iter().enumerate() {
            let path_mark = match active.path.iter().position(|&p| p == i) {
                Some(pos) if pos == active.focused => "*",
                Some(_) => "+",
                None => "",
            };
            println!(
                "  {:3}  {:5}  {:4}  {:7}  {}",
                i,
                m.depth,
                path_mark,
                segments[i].quoted_lines(),
                m.id
            );
        }

        let orphans = graph
            .messages
            .iter()
            .enumerate()
            .filter(|(i, m)| m.reply_to_id.is_some() && graph.parent_of(*i).is_none())
            .count();
        println!("  Active path length: {} (focused {})", active.len(), active.focused);
        println!("  Orphan replies (reply target not in thread): {}\n", orphans);
    }

    Ok(())
}
