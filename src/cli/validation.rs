use crate::cli::args::{CliArgs, Commands};
use crate::listing::PageSize;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.api_base.as_deref() {
        crate::utils::normalize_base_url(raw)
            .ok_or_else(|| format!("invalid --api-base '{raw}', expected an http(s) URL"))?;
    }
    match &args.command {
        Commands::List(list) => {
            if let Some(raw) = list.page.as_deref() {
                crate::utils::parse_positive_u32(raw, "--page")?;
            }
            if let Some(raw) = list.page_size.as_deref() {
                raw.parse::<PageSize>()
                    .map_err(|e| format!("invalid --page-size: {e}"))?;
            }
            for raw in &list.expand {
                crate::utils::parse_record_id(raw)?;
            }
        }
        Commands::Shell(shell) => {
            if let Some(raw) = shell.page_size.as_deref() {
                raw.parse::<PageSize>()
                    .map_err(|e| format!("invalid --page-size: {e}"))?;
            }
            if let Some(ms) = shell.debounce_ms {
                if ms > 60_000 {
                    return Err("invalid --debounce-ms, expected at most 60000".to_string());
                }
            }
        }
        Commands::Login(login) => {
            if login.email.trim().is_empty() {
                return Err("email must not be empty".to_string());
            }
        }
        Commands::Logout | Commands::Config(_) => {}
    }
    Ok(())
}
