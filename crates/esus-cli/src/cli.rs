use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "esus")]
#[command(about = "e-SUS PEC scheduling CLI: find citizens, list slots, book appointments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// GraphQL endpoint URL (overrides config and ESUS_ENDPOINT env var)
    #[arg(short, long, global = true, env = "ESUS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "ESUS_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to a PEC instance and store the credentials
    Login(LoginArgs),
    /// Logout (remove stored credentials)
    Logout,
    /// Show the access grants and active scope of the stored login
    Whoami,
    /// Search citizens by name, CPF or CNS
    Citizens(CitizensArgs),
    /// Show the health unit a citizen is bound to
    CitizenUnit(CitizenUnitArgs),
    /// List professionals of a health unit or occupation
    Professionals(ProfessionalsArgs),
    /// List the schedule slots of a scope on one day
    Slots(SlotsArgs),
    /// List the appointments booked for a scope on one day
    Appointments(AppointmentsArgs),
    /// Show the health unit a scope belongs to
    ScopeUnit(ScopeUnitArgs),
    /// Book an appointment for a citizen
    Book(BookArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// CPF or username
    #[arg(short, long)]
    pub username: Option<String>,
    /// Password
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct CitizensArgs {
    /// Name, CPF or CNS
    pub query: String,
    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
    /// Include contact details
    #[arg(long)]
    pub contact: bool,
}

#[derive(clap::Args)]
pub struct CitizenUnitArgs {
    /// Citizen id
    pub citizen_id: String,
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
pub struct ProfessionalsArgs {
    /// Health unit id (lists professionals with a configured schedule)
    #[arg(long)]
    pub unit: Option<String>,
    /// CBO occupation id
    #[arg(long)]
    pub cbo: Option<String>,
}

#[derive(clap::Args)]
pub struct SlotsArgs {
    /// Scope (lotação) id owning the schedule
    #[arg(long)]
    pub scope: String,
    /// Day as YYYY-MM-DD
    #[arg(long)]
    pub day: String,
    /// Show occupied slots too
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args)]
pub struct AppointmentsArgs {
    /// Scope (lotação) id
    #[arg(long)]
    pub scope: String,
    /// Day as YYYY-MM-DD
    #[arg(long)]
    pub day: String,
}

#[derive(clap::Args)]
pub struct ScopeUnitArgs {
    /// Scope (lotação) id
    pub scope_id: String,
}

#[derive(clap::Args)]
pub struct BookArgs {
    /// Citizen name, CPF or CNS
    pub citizen: String,
    /// Day as YYYY-MM-DD
    #[arg(long)]
    pub day: String,
    /// Professional position in the listing (e.g. 2) or id (id:7)
    #[arg(long)]
    pub professional: Option<String>,
    /// Scope position or id when the professional has several schedules
    #[arg(long)]
    pub scope: Option<String>,
    /// Slot position or id (id:<epoch ms>)
    #[arg(long)]
    pub slot: Option<String>,
    /// Plan the booking without creating it
    #[arg(long)]
    pub dry_run: bool,
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
    /// Key to set (endpoint, format, client_version)
    pub key: String,
    /// Value
    pub value: String,
}
