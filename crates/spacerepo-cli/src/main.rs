use std::{env, fs, sync::Arc, time::Duration};

use clap::Parser;
use cli::{Action, Args};
use logging::setup_logging;
use spacerepo_config::{
    config::{
        self, generate_default_config, get_config, get_current_profile, set_current_profile,
        Config, CONFIG_PATH,
    },
    error::ConfigError,
    paths::expand_tilde,
};
use spacerepo_core::{
    api::{login, logout, RpcSoftwareApi},
    commands::repo::dispatch,
    error::{ErrorContext, SpaceError},
    help::{HelpRegistry, RepoCommand},
    output::{OutputHandle, TracingSink},
    Shell, SpaceResult,
};
use spacerepo_rpc::{Client, ClientConfig};
use tracing::{debug, info, warn};
use ureq::Proxy;
use utils::{confirm_action, interactive_ask, COLOR};

mod cli;
mod logging;
mod utils;

fn set_config_path(path: &str) -> SpaceResult<()> {
    let path = expand_tilde(path);
    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()
            .with_context(|| "retrieving current directory".into())?
            .join(path)
    };

    let mut config_path = CONFIG_PATH.write().unwrap();
    *config_path = path;
    Ok(())
}

fn show_config() -> SpaceResult<()> {
    let config_path = CONFIG_PATH.read().unwrap().clone();

    let content = match fs::read_to_string(&config_path) {
        Ok(v) => v,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found", config_path.display());
            toml::to_string_pretty(&Config::default_config()).map_err(ConfigError::from)?
        }
        Err(err) => {
            return Err(SpaceError::IoError {
                action: "reading config".to_string(),
                source: err,
            });
        }
    };
    info!("{}", content);
    Ok(())
}

fn client_config(args: &Args, config: &Config, verify_ssl: bool) -> SpaceResult<ClientConfig> {
    let proxy = args
        .proxy
        .as_deref()
        .map(Proxy::new)
        .transpose()
        .map_err(|err| SpaceError::Custom(format!("Invalid proxy: {err}")))?;

    let mut client_config = ClientConfig {
        proxy,
        timeout: Some(Duration::from_secs(config.timeout())),
        verify_ssl,
        ..Default::default()
    };

    if let Some(user_agent) = args.user_agent.clone().or_else(|| config.user_agent.clone()) {
        client_config.user_agent = Some(user_agent);
    }

    Ok(client_config)
}

fn run_repo_command(args: &Args, cmd: RepoCommand, cmd_args: &str) -> SpaceResult<()> {
    config::init()?;

    if let Some(ref profile) = args.profile {
        set_current_profile(profile)?;
    }

    let config = get_config();
    let mut profile = config.active_profile()?;

    if let Some(ref server) = args.server {
        profile.server = server.clone();
    }
    if let Some(ref username) = args.username {
        profile.username = Some(username.clone());
    }

    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::MissingUsername(get_current_profile()))?;
    let password = match profile.password.clone() {
        Some(password) => password,
        None => interactive_ask(&format!("Password for {username}@{}: ", profile.server))?,
    };

    let client = Client::new(
        profile.api_url()?,
        &client_config(args, &config, profile.verify_ssl())?,
    );
    let session = login(&client, &username, &password)?;
    debug!("logged in as {username}");

    let out: OutputHandle = Arc::new(TracingSink);
    let shell = Shell::new(
        Arc::new(RpcSoftwareApi::new(client.clone())),
        session.clone(),
        HelpRegistry::with_usage(out.clone()),
        out,
    )
    .with_confirm(confirm_action);

    let result = dispatch(&shell, cmd, cmd_args);

    if let Err(err) = logout(&client, &session) {
        warn!("Failed to log out: {}", err);
    }

    result
}

fn handle_cli() -> SpaceResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }

    if let Some(ref c) = args.config {
        set_config_path(c)?;
    }

    match args.command.action() {
        Action::DefConfig => generate_default_config()?,
        Action::ShowConfig => show_config()?,
        Action::Repo(cmd, cmd_args) => run_repo_command(&args, cmd, &cmd_args)?,
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
