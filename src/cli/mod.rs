use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "novelgloss")]
#[command(author, version, about = "Glossary and prompt toolkit for web novel translation", long_about = None)]
pub struct Cli {
    /// Glossary database file (overrides config)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage series and global glossaries
    Glossary(GlossaryArgs),

    /// Resolve prompt builders per language pair and stage
    Prompt(PromptArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., storage.path)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show config file and glossary store paths
    Path,
}

#[derive(Parser, Debug)]
pub struct GlossaryArgs {
    #[command(subcommand)]
    pub action: GlossaryAction,
}

#[derive(Subcommand, Debug)]
pub enum GlossaryAction {
    /// Build a glossary key
    Key {
        #[command(subcommand)]
        scope: KeyScopeArgs,
    },

    /// Decode a glossary key
    Parse {
        key: String,
    },

    /// List stored glossaries
    List {
        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the entries of a glossary
    Show {
        key: String,

        /// Include global entries for the same language pair
        #[arg(long, default_value_t = false)]
        effective: bool,
    },

    /// Look up a term, falling back to the global glossary
    Lookup {
        key: String,
        term: String,
    },

    /// Add or replace an entry
    Add {
        key: String,

        /// Source term; repeat for variants
        #[arg(short, long = "term", required = true)]
        terms: Vec<String>,

        /// Target rendering or note
        #[arg(short, long)]
        value: String,
    },

    /// Remove a term from a glossary
    Remove {
        key: String,
        term: String,
    },

    /// Delete a glossary
    Delete {
        key: String,
    },

    /// Import entries from a JSON or plain-text file, replacing the glossary
    Import {
        key: String,
        file: PathBuf,
    },

    /// Print a glossary as JSON
    Export {
        key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyScopeArgs {
    /// Key bound to one series on one site
    Series(SeriesKeyArgs),

    /// Key shared by all series for a language pair
    Global(LanguageArgs),
}

#[derive(Args, Debug)]
pub struct SeriesKeyArgs {
    /// Site identifier (no underscores)
    pub domain: String,

    /// Series identifier
    pub series: String,

    #[command(flatten)]
    pub languages: LanguageArgs,
}

#[derive(Args, Debug)]
pub struct LanguageArgs {
    /// Source language (defaults to config)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Target language (defaults to config)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Parser, Debug)]
pub struct PromptArgs {
    #[command(subcommand)]
    pub action: PromptAction,
}

#[derive(Subcommand, Debug)]
pub enum PromptAction {
    /// Resolve and render the prompt for a language pair and stage
    Resolve {
        /// Language pair, e.g. ja_en
        pair: String,

        /// Pipeline stage
        stage: String,

        /// Positional arguments passed to the builder
        args: Vec<String>,

        /// Glossary key whose matching entries are passed as the second argument
        #[arg(long)]
        glossary: Option<String>,
    },

    /// List pipeline stages
    Stages,
}
