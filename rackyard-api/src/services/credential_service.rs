//! Credential Service
//!
//! Operator accounts. Passwords are hashed with SHA-256 before they reach
//! storage; verification compares digests.

use rackyard_core::{CreateUserError, PasswordDigest, StorageError, StorageResult, ValidationError};
use rackyard_storage::WarehouseStore;

fn require(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Create an operator account.
///
/// # Errors
/// - `Invalid` when the username or password is empty
/// - `AlreadyExists` when the username is taken
pub async fn create_user(
    store: &dyn WarehouseStore,
    username: &str,
    password: &str,
) -> Result<(), CreateUserError> {
    require(username, "username")?;
    require(password, "password")?;

    let digest = PasswordDigest::compute(password);
    store
        .user_insert(username, &digest)
        .await
        .map_err(|err| match err {
            StorageError::UniqueViolation { .. } => CreateUserError::AlreadyExists {
                username: username.to_string(),
            },
            other => CreateUserError::Storage(other),
        })?;

    tracing::info!(username, "User created");
    Ok(())
}

/// Check a username/password pair. Unknown users verify as `false`.
pub async fn verify_user(
    store: &dyn WarehouseStore,
    username: &str,
    password: &str,
) -> StorageResult<bool> {
    let digest = PasswordDigest::compute(password);
    store.user_verify(username, &digest).await
}
