use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::api::{Credentials, HttpApi, HttpOptions};
use crate::cli::args::{CliArgs, Commands, ConfigCommands, ListArgs, ShellArgs};
use crate::cli::shell::{self, ShellLine};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::listing::{Filter, PageSize, DEFAULT_DEBOUNCE};
use crate::output;
use crate::runner::{Command, Dashboard, Options};
use crate::session::{FileTokenStore, SessionGate, View};

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn print_banner(api_base: &str, storage: &str) {
    println!("fayda-admin v{}", env!("CARGO_PKG_VERSION"));
    format_kv_line("API", api_base);
    format_kv_line("Storage", storage);
    println!();
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

#[derive(Debug)]
struct RunConfig {
    no_color: bool,
    api_base: Option<String>,
    http: HttpOptions,
    storage: PathBuf,
    page_size: PageSize,
    debounce: Duration,
    command: Commands,
}

impl RunConfig {
    fn api_base(&self) -> Result<&str, String> {
        self.api_base.as_deref().ok_or_else(|| {
            format!(
                "no API base URL configured (use --api-base, {} or api_base in the config file)",
                config::API_BASE_ENV
            )
        })
    }

    fn http_api(&self) -> Result<HttpApi, String> {
        HttpApi::new(self.api_base()?, &self.http).map_err(|e| e.to_string())
    }

    fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.storage)
    }
}

fn build_run_config(
    args: CliArgs,
    cfg: ConfigFile,
    env_api_base: Option<String>,
) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let api_base = match args.api_base.or(env_api_base).or(cfg.api_base) {
        Some(raw) => Some(
            crate::utils::normalize_base_url(&raw)
                .ok_or_else(|| format!("invalid API base URL '{raw}'"))?,
        ),
        None => None,
    };

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy);

    let storage = args
        .storage
        .or(cfg.storage)
        .map(|p| config::expand_tilde(&p))
        .unwrap_or_else(config::default_storage_path);

    let command_page_size = match &args.command {
        Commands::Shell(ShellArgs { page_size, .. }) | Commands::List(ListArgs { page_size, .. }) => {
            page_size.clone()
        }
        _ => None,
    };
    let page_size = match command_page_size {
        Some(raw) => raw.parse::<PageSize>()?,
        None => match cfg.page_size {
            Some(count) => PageSize::from_count(count)
                .ok_or_else(|| format!("invalid page_size {count} in config"))?,
            None => PageSize::default(),
        },
    };

    let debounce_ms = match &args.command {
        Commands::Shell(shell) => shell.debounce_ms,
        _ => None,
    }
    .or(cfg.debounce_ms);
    let debounce = debounce_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE);

    Ok(RunConfig {
        no_color,
        api_base,
        http: HttpOptions {
            timeout: Duration::from_secs(timeout),
            proxy,
        },
        storage,
        page_size,
        debounce,
        command: args.command,
    })
}

fn list_filter(list: &ListArgs, page_size: PageSize) -> Result<Filter, String> {
    let mut filter = Filter::with_page_size(page_size);
    filter.phone_substring = list.phone.clone().unwrap_or_default();
    filter.name_substring = list.name.clone().unwrap_or_default();
    if let Some(raw) = list.page.as_deref() {
        filter.set_page(crate::utils::parse_positive_u32(raw, "--page")?);
    }
    Ok(filter)
}

async fn run_login(run: &RunConfig, email: &str, password: &str) -> Result<(), String> {
    let api = run.http_api()?;
    let mut gate = SessionGate::new(run.token_store());
    gate.login(&api, &Credentials::new(email, password))
        .await
        .map_err(|e| e.to_string())?;
    format_kv_line("Login", "ok");
    format_kv_line("Token", &run.storage.display().to_string());
    Ok(())
}

fn run_logout(run: &RunConfig) -> Result<(), String> {
    let mut gate = SessionGate::new(run.token_store());
    gate.logout().map_err(|e| e.to_string())?;
    format_kv_line("Logout", "ok");
    Ok(())
}

async fn run_list(run: &RunConfig, list: &ListArgs) -> Result<(), String> {
    let api = Arc::new(run.http_api()?);
    let options = Options {
        debounce: run.debounce,
        filter: list_filter(list, run.page_size)?,
    };
    let mut dashboard = Dashboard::new(api, run.token_store(), options);

    dashboard.start();
    if dashboard.view() == View::Login {
        return Err("not logged in; run `fayda-admin login` first".to_string());
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Loading users...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    dashboard.settle().await;
    spinner.finish_and_clear();

    if dashboard.view() == View::Login {
        return Err("the customer API refused the request; log in again".to_string());
    }

    for raw in &list.expand {
        let id = crate::utils::parse_record_id(raw)?;
        dashboard.handle(Command::Toggle(id)).await;
    }

    if list.json {
        let json = output::render_json(dashboard.list())
            .map_err(|e| format!("failed to serialize listing: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", output::render_text(dashboard.list()));
    }
    Ok(())
}

async fn run_shell(run: &RunConfig) -> Result<(), String> {
    let api = Arc::new(run.http_api()?);
    print_banner(run.api_base()?, &run.storage.display().to_string());
    println!("{}\n", shell::HELP);

    let options = Options {
        debounce: run.debounce,
        ..Options::default()
    }
    .with_page_size(run.page_size);
    let dashboard = Dashboard::new(api, run.token_store(), options);

    let (tx, rx) = mpsc::channel::<Command>(64);
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match shell::parse_line(&line) {
                Ok(ShellLine::Run(command)) => {
                    let quit = command == Command::Quit;
                    if tx.send(command).await.is_err() || quit {
                        break;
                    }
                }
                Ok(ShellLine::Help) => println!("{}", shell::HELP),
                Ok(ShellLine::Blank) => {}
                Err(e) => eprintln!("{e}"),
            }
        }
        debug!("stdin closed");
    });

    dashboard
        .run(rx, |frame| {
            println!("{}", output::render_frame(frame));
        })
        .await;
    reader.abort();
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    match &run.command {
        Commands::Login(login) => run_login(&run, &login.email, &login.password).await,
        Commands::Logout => run_logout(&run),
        Commands::List(list) => run_list(&run, list).await,
        Commands::Shell(_) => run_shell(&run).await,
        Commands::Config(_) => Ok(()),
    }
}

fn init_config_file(config_arg: Option<&str>, force: bool) -> Result<(), String> {
    let path = config_arg
        .map(config::expand_tilde)
        .or_else(config::default_config_path)
        .ok_or_else(|| "could not determine the home directory for the config file".to_string())?;
    if config::write_default_config_file(&path, force)? {
        format_kv_line("Config", &format!("written to {}", path.display()));
    } else {
        format_kv_line(
            "Config",
            &format!("{} already exists (use --force)", path.display()),
        );
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    dotenv::dotenv().ok();
    init_logging(args.verbose);

    if let Commands::Config(ConfigCommands::Init { force }) = &args.command {
        return init_config_file(args.config.as_deref(), *force);
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg, config::api_base_from_env())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    let result = rt.block_on(run_async(run));
    // stdin reads park a blocking thread that would hold a normal shutdown
    rt.shutdown_background();
    result
}
