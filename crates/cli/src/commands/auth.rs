//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! bme --email baker@example.com --password ... auth signup --name "Baker"
//! bme --email baker@example.com --password ... auth login
//! bme --email baker@example.com --password ... auth refresh
//! bme auth whoami
//! bme auth logout
//! ```

use bread_client::AppContext;
use clap::Subcommand;

use super::CommandError;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in with --email/--password
    Login,
    /// Create an account with --email/--password
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// Sign in, rotate the session token and reload the profile
    Refresh,
    /// Sign out and forget the cached identity
    Logout,
    /// Show the current identity
    Whoami,
}

pub async fn run(
    ctx: &AppContext,
    action: AuthAction,
    credentials: Option<(&str, &str)>,
) -> Result<(), CommandError> {
    match action {
        AuthAction::Login => {
            let (email, password) = credentials.ok_or(CommandError::NotSignedIn)?;
            sign_in(ctx, email, password).await?;
            whoami(ctx);
        }
        AuthAction::Signup { name } => {
            let (email, password) = credentials.ok_or(CommandError::NotSignedIn)?;
            let response = ctx.auth().signup(email, password, &name).await;
            if !response.success {
                return Err(CommandError::Auth(response.error.unwrap_or_default()));
            }
            if ctx.auth().is_authenticated() {
                whoami(ctx);
            } else {
                println!("Account created. Confirm your email, then run `bme auth login`.");
            }
        }
        AuthAction::Refresh => {
            let (email, password) = credentials.ok_or(CommandError::NotSignedIn)?;
            sign_in(ctx, email, password).await?;
            let response = ctx.auth().refresh().await;
            if !response.success {
                return Err(CommandError::Auth(response.error.unwrap_or_default()));
            }
            whoami(ctx);
        }
        AuthAction::Logout => {
            let response = ctx.auth().logout().await;
            if !response.success {
                return Err(CommandError::Auth(response.error.unwrap_or_default()));
            }
            println!("Signed out.");
        }
        AuthAction::Whoami => whoami(ctx),
    }
    Ok(())
}

/// Sign in, failing the command if the credentials are rejected.
pub async fn sign_in(ctx: &AppContext, email: &str, password: &str) -> Result<(), CommandError> {
    let response = ctx.auth().login(email, password).await;
    if response.success {
        Ok(())
    } else {
        Err(CommandError::Auth(response.error.unwrap_or_default()))
    }
}

fn whoami(ctx: &AppContext) {
    match ctx.auth().current_user() {
        Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role),
        None => println!("Not signed in."),
    }
}
