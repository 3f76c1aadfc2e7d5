//! Resolve the OpenPGP key commits are signed with.

use imgauto_git::{SecretString, SigningKey};

use crate::config::CommitConfig;
use crate::error::{Error, Result};
use crate::object::ObjectKey;
use crate::traits::SecretStore;

/// Read the signing key held by the secret `key`.
///
/// The key ring lives in the configured key field and must hold exactly one
/// secret key. A passphrase is read from the passphrase field when present.
///
/// # Errors
/// Returns an error if the secret or field is missing, the key ring does not
/// parse, or it holds zero or several secret keys.
pub async fn signing_key<S: SecretStore>(
    store: &S,
    key: &ObjectKey,
    config: &CommitConfig,
) -> Result<SigningKey> {
    let secret = store
        .get_secret(key)
        .await?
        .ok_or_else(|| Error::SigningSecretNotFound(key.clone()))?;

    let keyring = secret
        .data
        .get(&config.signing_key_field)
        .ok_or_else(|| Error::SigningKeyMissing {
            secret: key.clone(),
            field: config.signing_key_field.clone(),
        })?;
    let passphrase = secret
        .text(&config.signing_passphrase_field)
        .map(|p| SecretString::from(p.trim_end_matches('\n')));

    let keys = SigningKey::read_armored_keyring(keyring, passphrase.as_ref()).map_err(|source| {
        Error::SigningKeyUnreadable {
            secret: key.clone(),
            source,
        }
    })?;

    single_identity(keys, key)
}

/// The only element of `identities`.
fn single_identity<T>(identities: Vec<T>, secret: &ObjectKey) -> Result<T> {
    let mut identities = identities.into_iter();
    match (identities.next(), identities.next()) {
        (Some(identity), None) => Ok(identity),
        (None, _) => Err(Error::NoSigningIdentity(secret.clone())),
        (Some(_), Some(_)) => Err(Error::MultipleSigningIdentities(secret.clone())),
    }
}
