mod project;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use usfm_paracol_config::{Config, OutputFormat};

use project::Project;

#[derive(Parser, Debug)]
#[command(author, version, about = "Typeset parallel editions from USFM sources", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project configuration file, relative to the project root.
    #[arg(long, global = true, value_name = "FILE", default_value = "paracol.toml")]
    config: PathBuf,

    /// Project root that relative paths are resolved against.
    #[arg(
        long,
        global = true,
        value_name = "DIRECTORY_PATH",
        env = "PARACOL_ROOT",
        default_value = "."
    )]
    root: PathBuf,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Unpack source archives and loose USFM files into the build folder
    Unpack,

    /// Encode the configured book of one or more editions into JSON verse maps
    Parse {
        /// Edition labels. Defaults to the primary, secondary and skeleton editions.
        #[arg(value_name = "LABEL")]
        editions: Vec<String>,
    },

    /// Write an identity mapping table from an encoded edition
    Skeleton {
        /// Edition to take the verse list from. Defaults to `skeleton_edition`.
        #[arg(long, value_name = "LABEL")]
        edition: Option<String>,

        /// Overwrite an existing mapping table
        #[arg(long)]
        force: bool,
    },

    /// Join both editions through the mapping table into parallel rows
    Align,

    /// Render the parallel rows into a document
    Typeset {
        #[arg(long, value_enum)]
        format: Option<Format>,
    },

    /// Run unpack, parse, align and typeset in turn
    Build {
        #[arg(long, value_enum)]
        format: Option<Format>,
    },

    /// Decode one encoded verse and print the markup
    #[command(arg_required_else_help = true)]
    Render {
        /// Encoded verse text
        text: String,

        #[arg(long, value_enum)]
        format: Option<Format>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Latex,
    Html,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Latex => OutputFormat::Latex,
            Format::Html => OutputFormat::Html,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // RUST_LOG, when set, takes precedence over the default level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(root: &Path, config: &Path) -> Result<Config> {
    let config_path = root.join(config);
    if !config_path.exists() {
        log::debug!("no config at {}, using defaults", config_path.display());
    }
    Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.root, &cli.config)?;
    let project = Project::new(config, &cli.root);

    match cli.command {
        Commands::Unpack => {
            project.unpack()?;
        }
        Commands::Parse { editions } => {
            let editions = if editions.is_empty() {
                project.default_editions()
            } else {
                editions
            };
            for label in &editions {
                project.parse(label)?;
            }
        }
        Commands::Skeleton { edition, force } => {
            let label = edition.unwrap_or_else(|| project.config.skeleton_edition.clone());
            project.skeleton(&label, force)?;
        }
        Commands::Align => {
            project.align()?;
        }
        Commands::Typeset { format } => {
            project.typeset(project.format(format.map(Into::into)))?;
        }
        Commands::Build { format } => {
            project.build(project.format(format.map(Into::into)))?;
        }
        Commands::Render { text, format } => {
            println!("{}", project.render(&text, project.format(format.map(Into::into))));
        }
    }

    Ok(())
}
