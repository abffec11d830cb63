use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fayda-admin",
    version,
    about = "admin client for Fayda customer records",
    long_about = "fayda-admin logs in against the customer API and browses the paginated, searchable list of Fayda customer records.\n\nExamples:\n  fayda-admin --api-base https://api.example.com login --email admin@example.com --password secret\n  fayda-admin list --phone 0911 --page-size 20\n  fayda-admin shell\n\nTip: put api_base in ~/.fayda-admin/config.yml (or API_BASE in .env) to keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.fayda-admin/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'u',
        long = "api-base",
        visible_alias = "url",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Base URL of the customer API (overrides API_BASE)."
    )]
    pub api_base: Option<String>,

    #[arg(
        short = 'T',
        long = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'p',
        long = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'S',
        long = "storage",
        value_name = "FILE",
        global = true,
        help_heading = "Session",
        help = "File holding the session token (defaults to ~/.fayda-admin/storage.json)."
    )]
    pub storage: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Exchange credentials for a bearer token and store it.
    Login(LoginArgs),
    /// Forget the stored token.
    Logout,
    /// Fetch and print one page of customers.
    List(ListArgs),
    /// Interactive dashboard reading commands from stdin.
    Shell(ShellArgs),
    /// Manage the config file.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(short = 'e', long = "email", value_name = "EMAIL", help = "Account email.")]
    pub email: String,

    #[arg(
        short = 'P',
        long = "password",
        value_name = "PASSWORD",
        env = "FAYDA_PASSWORD",
        hide_env_values = true,
        help = "Account password."
    )]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long = "phone", value_name = "DIGITS", help = "Phone number substring.")]
    pub phone: Option<String>,

    #[arg(long = "name", value_name = "TEXT", help = "Name substring.")]
    pub name: Option<String>,

    #[arg(long = "page", value_name = "N", help = "Page number (1-based).")]
    pub page: Option<String>,

    #[arg(
        long = "page-size",
        visible_alias = "paginate",
        value_name = "N",
        help = "Rows per page (3, 5, 10, 20 or 50)."
    )]
    pub page_size: Option<String>,

    #[arg(
        long = "expand",
        value_name = "ID",
        action = ArgAction::Append,
        help = "Show the details panel for a record id (repeatable)."
    )]
    pub expand: Vec<String>,

    #[arg(long = "json", help = "Print {data, meta} as JSON.")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShellArgs {
    #[arg(
        long = "debounce-ms",
        value_name = "MS",
        help = "Pause after typing before a search is sent."
    )]
    pub debounce_ms: Option<u64>,

    #[arg(
        long = "page-size",
        visible_alias = "paginate",
        value_name = "N",
        help = "Initial rows per page (3, 5, 10, 20 or 50)."
    )]
    pub page_size: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Write a commented default config file.
    Init {
        #[arg(long = "force", help = "Overwrite an existing file.")]
        force: bool,
    },
}
