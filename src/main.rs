//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::content::Collection;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Content toolchain for a personal blog and portfolio site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new blog post or book review
    New {
        /// Collection to add to (blog, books)
        collection: Collection,

        /// Title of the new entry
        title: String,

        /// Book author (books only)
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Validate every content entry
    Check,

    /// Write the content manifest
    #[command(alias = "b")]
    Build {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Remove the output directory
    Clean,

    /// List site content
    List {
        /// What to list (blog, books, tags, styles)
        #[arg(default_value = "blog")]
        r#type: String,
    },

    /// Show where a request path ends up after redirects
    Resolve {
        /// Request path, e.g. /blog
        path: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            collection,
            title,
            author,
        } => {
            let site = folio::Site::new(&base_dir)?;
            tracing::info!("Creating new {} entry with title: {}", collection, title);
            let path = folio::commands::new::create_entry(
                &site,
                collection,
                &title,
                author.as_deref(),
            )?;
            println!("Created: {:?}", path);
        }

        Commands::Check => {
            let site = folio::Site::new(&base_dir)?;
            site.check()?;
            println!("All content is valid.");
        }

        Commands::Build { watch } => {
            let site = folio::Site::new(&base_dir)?;
            tracing::info!("Building content manifest...");

            let path = site.build()?;
            println!("Wrote {:?}", path);

            if watch {
                tracing::info!("Watching for file changes...");
                folio::commands::build::watch(&site).await?;
            }
        }

        Commands::Clean => {
            let site = folio::Site::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = folio::Site::new(&base_dir)?;
            folio::commands::list::run(&site, &r#type)?;
        }

        Commands::Resolve { path } => {
            let site = folio::Site::new(&base_dir)?;
            println!("{}", folio::commands::resolve::run(&site, &path));
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
