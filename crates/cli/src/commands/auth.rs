//! Sign-in commands.
//!
//! # Usage
//!
//! ```bash
//! mid-shop login -u jane -p secret
//! mid-shop register -u bob -e bob@example.com -p secret --first-name Bob
//! mid-shop whoami
//! mid-shop logout
//! ```

use mid_shop_core::{Credentials, Registration};

use super::{CliError, Context};
use crate::output;

pub async fn login(ctx: &Context, username: String, password: String) -> Result<(), CliError> {
    let identity = ctx
        .session
        .login(&Credentials::new(username, password))
        .await?;
    output::signed_in(&identity);
    Ok(())
}

pub async fn register(ctx: &Context, registration: Registration) -> Result<(), CliError> {
    let identity = ctx.session.register(&registration).await?;
    output::signed_in(&identity);
    Ok(())
}

pub fn logout(ctx: &Context) {
    ctx.session.logout();
    output::message("Signed out.");
}

pub fn whoami(ctx: &Context) {
    match ctx.session.current() {
        Some(identity) => output::identity(&identity),
        None => output::message("Not signed in."),
    }
}
