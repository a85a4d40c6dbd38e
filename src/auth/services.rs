use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password_async, verify_password_async},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::AppError,
    validation::{AddUser, SignIn},
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USER_EXISTS: &str = "User already exists";

/// Checks a username/password pair against the stored hash.
pub async fn authenticate(users: &dyn UserStore, input: SignIn) -> Result<User, AppError> {
    let Some(user) = users.find_by_username(&input.username).await? else {
        warn!(username = %input.username, "sign-in for unknown username");
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    };

    if !verify_password_async(input.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "sign-in with wrong password");
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    }

    info!(user_id = %user.id, "user signed in");
    Ok(user)
}

/// Creates a user unless the email or username is already taken.
pub async fn sign_up(
    users: &dyn UserStore,
    input: AddUser,
    is_admin: bool,
) -> Result<User, AppError> {
    if users.find_by_email(&input.email).await?.is_some()
        || users.find_by_username(&input.username).await?.is_some()
    {
        warn!(email = %input.email, username = %input.username, "user already exists");
        return Err(AppError::bad_request(USER_EXISTS));
    }

    let password_hash = hash_password_async(input.password).await?;
    let user = users
        .create(&NewUser {
            email: input.email,
            username: input.username,
            password_hash,
            is_admin,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, is_admin, "user created");
    Ok(user)
}
