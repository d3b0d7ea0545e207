pub mod auth;
pub mod password;
pub mod repo;

use crate::error::{BlogError, BlogResult};
use crate::profile::account_hooks::AccountHooks;
use password::{CleartextPassword, HashPassword};
use repo::UserRepo;

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

#[derive(serde::Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: CleartextPassword,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: time::OffsetDateTime,
}

impl From<repo::User> for Account {
    fn from(user: repo::User) -> Self {
        Self {
            id: user.user_id,
            full_name: full_name(&user.first_name, &user.last_name),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: user.date_joined,
        }
    }
}

const MIN_PASSWORD_LENGTH: usize = 8;

#[entrait(pub Accounts, mock_api=AccountsMock)]
pub mod accounts {
    use super::*;

    pub async fn create_account(
        deps: &(impl HashPassword + UserRepo + AccountHooks),
        new_account: NewAccount,
    ) -> BlogResult<Account> {
        validate_new_account(&new_account)?;

        let password_hash = deps.hash_password(new_account.password).await?;
        let user = deps
            .insert_user(repo::NewUser {
                username: new_account.username.trim(),
                email: new_account.email.trim(),
                first_name: new_account.first_name.trim(),
                last_name: new_account.last_name.trim(),
                password_hash,
            })
            .await?;

        tracing::info!(username = %user.username, "account created");

        deps.on_account_created(&user).await?;

        Ok(user.into())
    }

    pub async fn find_account(deps: &impl UserRepo, username: &str) -> BlogResult<Account> {
        deps.find_user_by_username(username)
            .await?
            .map(Into::into)
            .ok_or(BlogError::UserNotFound)
    }

    pub async fn delete_account(
        deps: &(impl auth::Authenticate + UserRepo),
        actor: auth::Actor,
    ) -> BlogResult<()> {
        let current_user_id = deps.authenticate(actor).await?;
        deps.delete_user(current_user_id).await?;

        tracing::info!(user_id = %current_user_id.0, "account deleted");
        Ok(())
    }

    fn validate_new_account(new_account: &NewAccount) -> BlogResult<()> {
        let username = new_account.username.trim();
        if username.is_empty() || username.chars().count() > 255 {
            return Err(BlogError::invalid(
                "username",
                "A username is required and can't exceed 255 characters",
            ));
        }
        if !is_valid_email(new_account.email.trim()) {
            return Err(BlogError::invalid(
                "email",
                "You must provide a valid email address",
            ));
        }
        for (field, value) in [
            ("first_name", &new_account.first_name),
            ("last_name", &new_account.last_name),
        ] {
            let value = value.trim();
            if value.is_empty() || value.chars().count() > 50 {
                return Err(BlogError::invalid(
                    field,
                    "This field is required and can't exceed 50 characters",
                ));
            }
        }
        if new_account.password.as_ref().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(BlogError::invalid(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Title-cased "First Last".
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", title_case(first_name), title_case(last_name))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        word_start = !c.is_alphabetic();
    }
    out
}
