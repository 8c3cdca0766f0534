use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::logging;
use crate::notify;
use crate::session::SessionHolder;
use crate::storage::FileStore;
use crate::validate::{SignInForm, SignUpForm};

#[derive(Debug, Args, Clone)]
pub struct SignInArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Account password (prompted when omitted)
    #[arg(short, long, env = "NSE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SignUpArgs {
    #[arg(long)]
    pub firstname: String,

    #[arg(long)]
    pub lastname: String,

    /// 10-digit mobile number
    #[arg(long)]
    pub mobile: String,

    #[arg(long)]
    pub email: String,

    /// Password, at least 6 characters (prompted when omitted)
    #[arg(long, env = "NSE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Repeat of the password (prompted when omitted)
    #[arg(long)]
    pub confirm_password: Option<String>,
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn sign_in(args: SignInArgs, settings: &Settings) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt("Password")?,
    };
    let request = SignInForm {
        email: args.email,
        password,
    }
    .validate()?;

    let client = ApiClient::new(&settings.api_url)?;
    let response = match client.sign_in(&request).await {
        Ok(response) => response,
        Err(err) => {
            notify::error(&err.to_string());
            return Err(err).context("sign-in failed");
        }
    };

    let mut session = SessionHolder::initialize(FileStore::open(&settings.state_dir));
    session.sign_in(response.encoded_token);
    logging::info(
        "auth.signin",
        "Signed in",
        json!({ "email": request.email, "role": session.session().user_role }),
    );
    notify::success(response.message.as_deref().unwrap_or("Signed in successfully"));
    Ok(())
}

pub async fn sign_up(args: SignUpArgs, settings: &Settings) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt("Password")?,
    };
    let confirm_password = match args.confirm_password {
        Some(confirm) => confirm,
        None => prompt("Confirm password")?,
    };
    let request = SignUpForm {
        firstname: args.firstname,
        lastname: args.lastname,
        mobile: args.mobile,
        email: args.email,
        password,
        confirm_password,
    }
    .validate()?;

    let client = ApiClient::new(&settings.api_url)?;
    match client.sign_up(&request).await {
        Ok(ack) => {
            notify::success(ack.message.as_deref().unwrap_or("Account created; sign in to continue"));
            Ok(())
        }
        Err(err) => {
            notify::error(&err.to_string());
            Err(err).context("sign-up failed")
        }
    }
}

pub fn logout(settings: &Settings) -> Result<()> {
    let mut session = SessionHolder::initialize(FileStore::open(&settings.state_dir));
    session.clear();
    notify::success("Logged Out");
    Ok(())
}

pub fn whoami(settings: &Settings) -> Result<()> {
    let session = SessionHolder::initialize(FileStore::open(&settings.state_dir));
    let state = session.session();
    if state.is_authenticated() {
        println!(
            "Signed in (role: {})",
            state.user_role.as_deref().unwrap_or("unknown")
        );
    } else {
        println!("Not signed in");
    }
    Ok(())
}
