use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "smartcare")]
#[command(about = "SmartCare CLI: patient monitoring from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL (overrides config and SMARTCARE_URL env var)
    #[arg(short, long, global = true, env = "SMARTCARE_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "SMARTCARE_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and keep the session cookie for this profile
    Login(LoginArgs),
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign out of the server session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Run the session check and report the outcome
    Status,
    /// Open a route through the access gate (e.g. /accounts)
    Open(OpenArgs),
    /// List a collection
    List(ListArgs),
    /// Create a record from JSON
    Create(CreateArgs),
    /// Update a record from a partial JSON body
    Update(UpdateArgs),
    /// Delete a record
    Delete(DeleteArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

/// Collections served by the API.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ResourceName {
    Patients,
    Guardians,
    Accidents,
    Cameras,
    Messages,
    Rooms,
    EnvLogs,
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long)]
    pub username: String,
    /// Password
    #[arg(long)]
    pub password: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    Director,
    Nurse,
    Patient,
    Guardian,
}

#[derive(clap::Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub username: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub email: String,
    /// Display name
    #[arg(long)]
    pub name: String,
    #[arg(long, value_enum)]
    pub role: RoleArg,
    /// Preferred notification language (ko, en)
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(clap::Args)]
pub struct OpenArgs {
    /// Route path (e.g. /dashboard, /patients/3)
    pub path: String,
}

#[derive(clap::Args)]
pub struct ListArgs {
    pub resource: ResourceName,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    pub resource: ResourceName,
    /// Path to JSON file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    pub resource: ResourceName,
    /// Record id
    pub id: i64,
    /// Path to JSON file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    pub resource: ResourceName,
    /// Record id
    pub id: i64,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format, language, log_level)
    pub key: String,
    /// Value
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crud_commands() {
        let cli = Cli::try_parse_from(["smartcare", "delete", "env-logs", "7"]).unwrap();
        match cli.command {
            Commands::Delete(args) => {
                assert_eq!(args.resource, ResourceName::EnvLogs);
                assert_eq!(args.id, 7);
            }
            _ => panic!("expected delete"),
        }
        assert_eq!(cli.profile, "default");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::from_name("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_name("xml"), None);
    }
}
