//! Sign in, sign up, sign out.
//!
//! The session token is stored in the state directory and reused by later
//! commands until it expires.

use clap::Subcommand;
use marketstall_core::validate_password_confirmation;
use marketstall_storefront::Storefront;
use secrecy::{ExposeSecret, SecretString};

use super::Result;
use crate::output;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
}

pub async fn run(app: &Storefront, action: AuthAction) -> Result<()> {
    let auth = app.auth();
    match action {
        AuthAction::Login { email, password } => {
            let password = SecretString::from(password);
            let user = auth.login(&email, password.expose_secret()).await?;
            output::user(&user);
        }
        AuthAction::Signup {
            first_name,
            last_name,
            email,
            password,
            confirm,
        } => {
            let password = SecretString::from(password);
            validate_password_confirmation(password.expose_secret(), &confirm)?;
            let user = auth
                .signup(&first_name, &last_name, &email, password.expose_secret())
                .await?;
            output::user(&user);
        }
        AuthAction::Logout => {
            auth.logout().await;
            tracing::info!("Signed out");
        }
        AuthAction::Whoami => match auth.initialize().await.user() {
            Some(user) => output::user(user),
            None => tracing::info!("Not signed in"),
        },
    }
    Ok(())
}
