//! blogsmith CLI
//!
//! Static blog generator: articles and pages with a small header block, tag
//! indexes, an RSS feed and a live rebuild server.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for blogsmith.
#[derive(Parser)]
#[command(
    name = "blogsmith",
    version,
    about = "A static blog generator with tag indexes and RSS feeds"
)]
struct Cli {
    /// Path to configuration file [default: <source>/config.json]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Build the site
    Build {
        /// Source directory
        #[arg(short, long, default_value = ".")]
        source: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "public")]
        output: PathBuf,
        /// Include draft documents
        #[arg(long)]
        drafts: bool,
        /// Minify generated HTML
        #[arg(long)]
        minify: bool,
    },
    /// Rebuild on change and serve the output
    Live {
        /// Source directory
        #[arg(short, long, default_value = ".")]
        source: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".tmp")]
        output: PathBuf,
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
        /// Include draft documents
        #[arg(long)]
        drafts: bool,
    },
    /// Validate configuration and content without writing output
    Check {
        /// Source directory
        #[arg(short, long, default_value = ".")]
        source: PathBuf,
        /// Also check draft documents
        #[arg(long)]
        drafts: bool,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Create a new site source directory
    Init {
        /// Directory to create
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    blogsmith::init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Build {
            source,
            output,
            drafts,
            minify,
        } => {
            blogsmith::cmd::build::run(config, &source, &output, drafts, minify)?;
        }
        Commands::Live {
            source,
            output,
            port,
            drafts,
        } => {
            blogsmith::cmd::live::run(config, &source, &output, port, drafts).await?;
        }
        Commands::Check {
            source,
            drafts,
            strict,
        } => {
            blogsmith::cmd::check::run(config, &source, drafts, strict)?;
        }
        Commands::Init { dir } => {
            blogsmith::cmd::init::run(&dir)?;
        }
    }

    Ok(())
}
