//! CLI command handling

use std::path::Path;

use crate::commands::{Commands, ConnectionArgs};
use crate::common::paths::config_path;
use crate::common::{Config, Overrides, Result, Settings};
use crate::testing::{run_scenario, run_scenario_file, TestScenario};

/// Process exit code when a run was aborted by a fatal error
pub const EXIT_ABORTED: i32 = 2;

impl From<ConnectionArgs> for Overrides {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            base_url: args.base_url,
            email: args.email,
            password: args.password,
            timeout_secs: args.timeout_secs,
        }
    }
}

/// Dispatch a CLI command; `Ok(false)` means the scenario ran and failed
pub async fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Run {
            scenario,
            connection,
            verbose,
        } => {
            let settings = Settings::resolve(&connection.into())?;
            let result = match scenario {
                Some(path) => run_scenario_file(&path, &settings, verbose).await?,
                None => run_scenario(&TestScenario::idea_lifecycle(), &settings, verbose).await?,
            };
            Ok(result.passed)
        }

        Commands::Scenario => {
            print!("{}", TestScenario::idea_lifecycle().to_yaml()?);
            Ok(true)
        }

        Commands::Config { connection } => {
            let mut config = Config::load()?;
            config.apply_env()?;
            config.apply_overrides(&connection.into());
            print!("{}", render_config(&config, config_path().as_deref()));
            Ok(true)
        }
    }
}

/// Map a dispatch result to the process exit code
///
/// 0 when everything passed, 1 when steps failed or a non-fatal error
/// escaped, [`EXIT_ABORTED`] when the run could not start.
pub fn exit_code(result: &Result<bool>) -> i32 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) if e.is_fatal() => EXIT_ABORTED,
        Err(_) => 1,
    }
}

/// Describe merged configuration without requiring it to be complete
fn render_config(config: &Config, path: Option<&Path>) -> String {
    let file = match path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not present)", path.display()),
        None => "<no config directory on this platform>".to_string(),
    };
    let password = if config.credentials.password.is_some() {
        "<set>"
    } else {
        "<unset>"
    };
    let timeout = match config.http.timeout_secs {
        Some(secs) => format!("{secs}s"),
        None => "transport default".to_string(),
    };

    let base_url = or_unset(config.api.base_url.as_deref());
    let email = or_unset(config.credentials.email.as_deref());
    let user_agent = &config.http.user_agent;

    format!(
        "Config file: {file}\n\
         Base URL:    {base_url}\n\
         Email:       {email}\n\
         Password:    {password}\n\
         Timeout:     {timeout}\n\
         User-Agent:  {user_agent}\n"
    )
}

fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("<unset>")
}
