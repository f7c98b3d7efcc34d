//! # directctl
//!
//! Command-line access to the Direct JSON API.
//!
//! ```bash
//! # Print the URL to authorize the application with
//! directctl authorize-url --state my-state
//!
//! # Exchange the code we were redirected with, storing the token in the keyring
//! directctl login 1234567 --login my-client-login
//!
//! # Call any remote procedure (outputs JSON)
//! directctl call getCampaignsList '["my-client-login"]'
//! ```
//!
//! The application credentials are read from `DIRECTCTL_CLIENT_ID` and
//! `DIRECTCTL_CLIENT_SECRET`.

use anyhow::{Context, Result};
use argh::FromArgs;
use directctl::{
    oauth::storage::{StoredToken, TokenStorage},
    CacheSettings, DirectClient, DirectConfig,
};
use serde_json::Value;
use std::env;

#[derive(FromArgs)]
/// Command-line client for the Direct JSON API
struct Cli {
    /// use the sandbox API instead of production
    #[argh(switch)]
    sandbox: bool,

    /// log the duration of every request
    #[argh(switch)]
    debug: bool,

    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    AuthorizeUrl(AuthorizeUrlArgs),
    Login(LoginArgs),
    Call(CallArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "authorize-url")]
/// print the URL to authorize this application with
struct AuthorizeUrlArgs {
    /// arbitrary state passed back after authorization
    #[argh(option)]
    state: Option<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "login")]
/// exchange an authorization code and store the obtained token
struct LoginArgs {
    /// the code received after authorization
    #[argh(positional)]
    code: String,

    /// the account login to remember alongside the token
    #[argh(option)]
    login: Option<String>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// call a remote procedure and print its outcome as JSON
struct CallArgs {
    /// procedure name, e.g. getCampaignsList or GetCampaignsList
    #[argh(positional)]
    method: String,

    /// parameters as JSON
    #[argh(positional)]
    params: Option<String>,

    /// cache responses for the given number of seconds
    #[argh(option)]
    cache_ttl: Option<u64>,
}

/// Builds our configuration from the environment and global flags.
fn config_from_env(cli: &Cli) -> Result<DirectConfig> {
    let client_id = env::var("DIRECTCTL_CLIENT_ID").context("DIRECTCTL_CLIENT_ID must be set")?;
    // Only the token exchange needs the secret.
    let client_secret = env::var("DIRECTCTL_CLIENT_SECRET").unwrap_or_default();

    Ok(DirectConfig {
        client_id,
        client_secret,
        use_sandbox: cli.sandbox,
        debug: cli.debug,
        ..Default::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Logs go to stderr so that JSON output can be piped.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config_from_env(&cli)?;
    match cli.command {
        Commands::AuthorizeUrl(args) => {
            let client = DirectClient::new(config)?;
            println!("{}", client.authorize_url(args.state.as_deref()));
            Ok(())
        }
        Commands::Login(args) => run_login(config, args).await,
        Commands::Call(args) => {
            if let Some(ttl_secs) = args.cache_ttl {
                config.cache = CacheSettings {
                    enabled: true,
                    ttl_secs,
                    ..Default::default()
                };
            }
            run_call(config, args).await
        }
    }
}

async fn run_login(config: DirectConfig, args: LoginArgs) -> Result<()> {
    let mut client = DirectClient::new(config)?;
    let access_token = client
        .exchange_code(&args.code)
        .await
        .context("unable to obtain access token")?
        .clone();

    let storage = TokenStorage::open()?;
    storage.store(&StoredToken {
        access_token,
        login: args.login,
    })?;

    eprintln!("Access token stored.");
    Ok(())
}

async fn run_call(config: DirectConfig, args: CallArgs) -> Result<()> {
    let params: Option<Value> = args
        .params
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("parameters must be valid JSON")?;

    let stored = TokenStorage::open()?
        .load()?
        .context("no stored token; run `directctl login` first")?;

    let mut client = DirectClient::new(config)?.with_token(stored.access_token);
    client.set_login(stored.login);

    let outcome = client.invoke(&args.method, params).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_parses_method_and_params() {
        let cli = Cli::from_args(
            &["directctl"],
            &["--sandbox", "call", "getBalance", "[123]", "--cache-ttl", "60"],
        )
        .unwrap();

        assert!(cli.sandbox);
        match cli.command {
            Commands::Call(CallArgs {
                method,
                params,
                cache_ttl,
            }) => {
                assert_eq!(method, "getBalance");
                assert_eq!(params.as_deref(), Some("[123]"));
                assert_eq!(cache_ttl, Some(60));
            }
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn params_are_optional() {
        let cli = Cli::from_args(&["directctl"], &["call", "pingAPI"]).unwrap();
        match cli.command {
            Commands::Call(CallArgs { params, .. }) => assert_eq!(params, None),
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn login_takes_code_and_login() {
        let cli =
            Cli::from_args(&["directctl"], &["login", "1234567", "--login", "client"]).unwrap();
        match cli.command {
            Commands::Login(LoginArgs { code, login }) => {
                assert_eq!(code, "1234567");
                assert_eq!(login.as_deref(), Some("client"));
            }
            _ => panic!("Expected Login command"),
        }
    }
}
