use clap::{ArgAction, Parser, Subcommand};
use spacerepo_core::help::RepoCommand;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Set current profile
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the server of the selected profile
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Override the username of the selected profile
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the configuration file to stdout
    Config,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// List all available user repos
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Show the details of user repos matching the given patterns
    #[clap(name = "details", visible_alias = "info")]
    Details {
        /// Repository labels or glob patterns
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show the filters for a user repo
    #[clap(name = "listfilters")]
    ListFilters {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Add filters to a user repo
    ///
    /// Each filter starts with + (include) or - (exclude)
    #[clap(name = "addfilters")]
    AddFilters {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Remove filters from a user repo
    #[clap(name = "removefilters")]
    RemoveFilters {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Replace the filters of a user repo
    #[clap(name = "setfilters")]
    SetFilters {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Clear the filters of a user repo
    #[clap(name = "clearfilters")]
    ClearFilters {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Create a user repo
    #[clap(name = "create")]
    Create {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Delete user repos matching the given patterns
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Rename a user repo
    #[clap(name = "rename")]
    Rename {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Change the URL of a user repo
    #[clap(name = "updateurl")]
    UpdateUrl {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Change the SSL certificates of a user repo
    #[clap(name = "updatessl")]
    UpdateSsl {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// What a parsed subcommand does.
#[derive(Debug, PartialEq)]
pub enum Action {
    ShowConfig,
    DefConfig,
    /// A repository command with its arguments joined into a single string.
    Repo(RepoCommand, String),
}

impl Commands {
    pub fn action(&self) -> Action {
        let (cmd, args) = match self {
            Commands::Config => return Action::ShowConfig,
            Commands::DefConfig => return Action::DefConfig,
            Commands::List => return Action::Repo(RepoCommand::List, String::new()),
            Commands::Details {
                args,
            } => (RepoCommand::Details, args),
            Commands::ListFilters {
                args,
            } => (RepoCommand::ListFilters, args),
            Commands::AddFilters {
                args,
            } => (RepoCommand::AddFilters, args),
            Commands::RemoveFilters {
                args,
            } => (RepoCommand::RemoveFilters, args),
            Commands::SetFilters {
                args,
            } => (RepoCommand::SetFilters, args),
            Commands::ClearFilters {
                args,
            } => (RepoCommand::ClearFilters, args),
            Commands::Create {
                args,
            } => (RepoCommand::Create, args),
            Commands::Delete {
                args,
            } => (RepoCommand::Delete, args),
            Commands::Rename {
                args,
            } => (RepoCommand::Rename, args),
            Commands::UpdateUrl {
                args,
            } => (RepoCommand::UpdateUrl, args),
            Commands::UpdateSsl {
                args,
            } => (RepoCommand::UpdateSsl, args),
        };

        Action::Repo(cmd, args.join(" "))
    }
}
