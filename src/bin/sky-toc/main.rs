//! sky-toc CLI tool
//!
//! Command-line interface for extracting post outlines ahead of time.
//!
//! ## Commands
//!
//! - `outline <file>`: Print the heading tree (or the outline as JSON with `--json`)
//! - `render <file>`: Print the outline list markup, optionally followed by the article HTML with
//!   heading ids filled in
//!
//! The input format follows the file extension: `.md`/`.markdown` are parsed as Markdown,
//! anything else as rendered HTML. Use `--format` to override.

use clap::{Parser, Subcommand};
use sky_toc::{
    config::{ConfigProvider, OutlineConfig, TomlConfigProvider},
    extract::{Post, PostFormat},
    render::to_markup,
    HeadingNode, Outline,
};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "sky-toc")]
#[command(author, version, about = "Extract and render post outlines", long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Input format, overriding the file extension (md, html)
    #[arg(short, long, global = true)]
    format: Option<PostFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the heading tree of a post
    Outline {
        /// Path to the post
        path: PathBuf,

        /// Print the outline forest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the outline list markup of a post
    Render {
        /// Path to the post
        path: PathBuf,

        /// Also print the article HTML with heading ids filled in
        #[arg(long)]
        with_article: bool,
    },
}

fn load_outline(
    path: &Path,
    format: Option<PostFormat>,
    config: &OutlineConfig,
) -> Result<(Post, Option<Outline>), Box<dyn std::error::Error>> {
    let content = read_to_string(path)?;
    let format = format.unwrap_or_else(|| PostFormat::from_path(path));
    tracing::debug!("Parsing {:?} as {:?}", path, format);
    let mut post = Post::parse(&content, format, &config.selectors)?;
    let outline = post.build_outline();
    Ok((post, outline))
}

fn print_tree(nodes: &[HeadingNode], depth: usize) {
    for node in nodes {
        println!("{}- {} (#{})", "  ".repeat(depth), node.text, node.id);
        print_tree(&node.children, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TomlConfigProvider::new(path).load()?,
        None => OutlineConfig::default(),
    };

    match cli.command {
        Commands::Outline { path, json } => {
            let (_post, outline) = load_outline(&path, cli.format, &config)?;
            let Some(outline) = outline else {
                tracing::info!("No headings found in {:?}", path);
                if json {
                    println!("[]");
                }
                return Ok(());
            };
            tracing::info!("Found {} heading(s) in {:?}", outline.len(), path);
            if json {
                println!("{}", serde_json::to_string_pretty(outline.roots())?);
            } else {
                print_tree(outline.roots(), 0);
            }
        }
        Commands::Render { path, with_article } => {
            let (post, outline) = load_outline(&path, cli.format, &config)?;
            match &outline {
                Some(outline) => println!("{}", to_markup(outline.roots())),
                None => tracing::info!("No headings found in {:?}, outline hidden", path),
            }
            if with_article {
                println!("{}", post.to_html());
            }
        }
    }

    Ok(())
}
