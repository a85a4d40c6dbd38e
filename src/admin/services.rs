use anyhow::{bail, Context};
use tracing::info;

use crate::{
    auth::{repo::UserStore, repo_types::User, services::sign_up},
    config::AdminBootstrap,
    validation::{validate_add_user, FormFields, Validated},
};

/// Creates the configured admin account unless its username or email is taken.
pub async fn bootstrap_admin(
    users: &dyn UserStore,
    admin: &AdminBootstrap,
) -> anyhow::Result<Option<User>> {
    let fields = FormFields::from([
        ("email".to_string(), admin.email.clone()),
        ("username".to_string(), admin.username.clone()),
        ("password".to_string(), admin.password.clone()),
    ]);
    let input = match validate_add_user(&fields) {
        Validated::Valid(input) => input,
        Validated::Invalid(errors) => bail!("invalid admin bootstrap settings: {errors:?}"),
    };

    if users.find_by_username(&input.username).await?.is_some()
        || users.find_by_email(&input.email).await?.is_some()
    {
        info!(username = %input.username, "admin account already present");
        return Ok(None);
    }

    let user = sign_up(users, input, true)
        .await
        .context("create admin account")?;
    Ok(Some(user))
}
