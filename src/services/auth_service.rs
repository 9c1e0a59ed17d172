use crate::error::AppError;
use crate::models::User;
use crate::store::AccountStore;
use bcrypt::{hash, verify};
use uuid::Uuid;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
// Lowest cost bcrypt accepts, keeps the tests fast
#[cfg(test)]
const HASH_COST: u32 = 4;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, HASH_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

pub async fn register_user<S: AccountStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
    is_staff: bool,
) -> Result<User, AppError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let user = User {
        id: generate_id(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        is_staff,
    };
    store.create_user(&user).await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok(user)
}

/// Check the credentials and return the user's session token, opening one
/// on first login.
pub async fn login<S: AccountStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<(String, User), AppError> {
    let user = store
        .find_user_by_username(username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    if let Some(token) = store.session_for_user(&user.id).await? {
        return Ok((token, user));
    }

    let token = generate_id();
    store.create_session(&token, &user.id).await?;
    Ok((token, user))
}

/// Create the configured staff account unless the username is already taken.
pub async fn ensure_admin<S: AccountStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<(), AppError> {
    if store.find_user_by_username(username).await?.is_some() {
        tracing::debug!("Admin user {} already present", username);
        return Ok(());
    }
    register_user(store, username, password, true).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_password_round_trip() {
        let hashed = hash_password("w@ndEr").unwrap();
        assert!(verify_password("w@ndEr", &hashed).unwrap());
        assert!(!verify_password("wander", &hashed).unwrap());
    }

    #[tokio::test]
    async fn test_login_opens_session() {
        let store = MemoryStore::new();
        let user = register_user(&store, "cypress", "w@ndEr", false).await.unwrap();

        let (token, logged_in) = login(&store, "cypress", "w@ndEr").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let resolved = store.user_for_session(&token).await.unwrap().unwrap();
        assert_eq!(resolved.username, "cypress");
    }

    #[tokio::test]
    async fn test_repeated_login_reuses_session() {
        let store = MemoryStore::new();
        register_user(&store, "cypress", "w@ndEr", false).await.unwrap();

        let (first, _) = login(&store, "cypress", "w@ndEr").await.unwrap();
        let (second, _) = login(&store, "cypress", "w@ndEr").await.unwrap();
        assert_eq!(first, second);
        assert!(store.user_for_session(&first).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let store = MemoryStore::new();
        register_user(&store, "cypress", "w@ndEr", false).await.unwrap();

        assert!(matches!(
            login(&store, "cypress", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&store, "nobody", "w@ndEr").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_blanks() {
        let store = MemoryStore::new();
        register_user(&store, "cypress", "w@ndEr", false).await.unwrap();

        assert!(matches!(
            register_user(&store, "cypress", "other", false).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            register_user(&store, " ", "pw", false).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let store = MemoryStore::new();
        ensure_admin(&store, "admin", "secret").await.unwrap();
        ensure_admin(&store, "admin", "secret").await.unwrap();

        let admin = store.find_user_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_staff);
    }
}
