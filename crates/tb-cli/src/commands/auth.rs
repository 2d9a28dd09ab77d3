//! Account commands: signup, login, logout, whoami

use super::context::{fail, AppContext};
use super::GlobalArgs;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::Password;
use tb_core::view::AuthForms;

/// Arguments for the signup command
#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Email address of the new account
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "THREADBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Password confirmation (defaults to --password)
    #[arg(long, requires = "password")]
    pub confirm: Option<String>,
}

/// Arguments for the login command
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "THREADBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

fn prompt_password(prompt: &str) -> Result<String> {
    Ok(Password::new().with_prompt(prompt).interact()?)
}

pub fn signup(args: SignupArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let (password, confirm) = match args.password {
        Some(password) => {
            let confirm = args.confirm.unwrap_or_else(|| password.clone());
            (password, confirm)
        }
        None => (
            prompt_password("Password")?,
            prompt_password("Confirm password")?,
        ),
    };

    let mut forms = AuthForms::new(ctx.auth(), &ctx.config.auth);
    let session = forms
        .sign_up(&args.email, &password, &confirm)
        .map_err(fail)?;

    println!(
        "{} Account created. Signed in as {}.",
        "✓".green(),
        session.user.username().cyan()
    );
    Ok(())
}

pub fn login(args: LoginArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    let mut forms = AuthForms::new(ctx.auth(), &ctx.config.auth);
    let session = forms.sign_in(&args.email, &password).map_err(fail)?;

    println!(
        "{} Signed in as {}.",
        "✓".green(),
        session.user.username().cyan()
    );
    Ok(())
}

pub fn logout(global: &GlobalArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    if !ctx.session().is_signed_in() {
        println!("Not logged in.");
        return Ok(());
    }

    let mut forms = AuthForms::new(ctx.auth(), &ctx.config.auth);
    forms.sign_out().map_err(fail)?;
    println!("{} Signed out.", "✓".green());
    Ok(())
}

pub fn whoami(global: &GlobalArgs) -> Result<()> {
    let ctx = AppContext::load(global)?;
    match ctx.session().user() {
        Some(user) => println!("{} ({})", user.username().cyan(), user.email),
        None => println!("Not logged in."),
    }
    Ok(())
}
