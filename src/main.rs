//! Command-line entry point.

use clap::{Args, Parser, Subcommand};
use mdpress::engine::{Engine, EngineConfig};
use mdpress::{highlight, output, scaffold, serve};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdpress", version, about = "Static site generator for date-prefixed markdown")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Build settings shared by `build` and `serve`.
#[derive(Args)]
struct BuildArgs {
    /// Source directory containing docs/
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Output directory (default: <source>/dist)
    #[arg(long)]
    dist: Option<PathBuf>,

    /// Theme directory (default: <source>/.theme)
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Author attributed to every document
    #[arg(long)]
    author: Option<String>,

    /// URL prefix for sites served from a subpath
    #[arg(long)]
    context: Option<String>,

    #[arg(long, help = style_help())]
    style: Option<String>,
}

fn style_help() -> String {
    format!(
        "Code block style: {}",
        highlight::style_names().join(", ")
    )
}

impl BuildArgs {
    fn into_config(self) -> EngineConfig {
        EngineConfig {
            source: self.source,
            dist: self.dist,
            theme: self.theme,
            author: self.author,
            context_path: self.context,
            style: self.style,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build the site once
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Build, serve locally, and rebuild on changes
    Serve {
        #[command(flatten)]
        args: BuildArgs,

        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Scaffold a new site in an empty directory
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        target: PathBuf,

        /// Site title written to meta.yaml
        #[arg(long, default_value = scaffold::DEFAULT_TITLE)]
        title: String,
    },
    /// Create a new document named <today>-<slug>.md
    Create {
        /// Document title
        title: String,

        /// Source directory containing docs/
        #[arg(long, default_value = ".")]
        source: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build { args } => {
            let engine = Engine::new(args.into_config());
            let pages = engine.run()?;
            output::print_build_report(&pages, engine.dist());
        }
        Command::Serve { args, port } => {
            serve::serve(Engine::new(args.into_config()), port)?;
        }
        Command::Init { target, title } => {
            let files = scaffold::init_project(&target, &title)?;
            println!("{}", output::format_init_listing(&files));
            println!("Initialized {} in {}", title, target.display());
        }
        Command::Create { title, source } => {
            let path = scaffold::create_post(&source.join("docs"), &title)?;
            println!("{}", output::format_created_post(&path));
        }
    }
    Ok(())
}
