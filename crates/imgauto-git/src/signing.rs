//! OpenPGP commit signing.

use std::io::Cursor;

use chrono::{SubsecRound, Utc};
use pgp::crypto::hash::HashAlgorithm;
use pgp::packet::{SignatureConfig, SignatureType, Subpacket, SubpacketData};
use pgp::types::PublicKeyTrait;
use pgp::{ArmorOptions, Deserializable, SignedSecretKey, StandaloneSignature};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};

/// A secret key able to produce detached commit signatures.
pub struct SigningKey {
    key: SignedSecretKey,
    passphrase: Option<SecretString>,
}

impl SigningKey {
    /// Read every secret key from an ASCII-armored key ring.
    ///
    /// An empty key ring yields an empty list; the caller decides how many
    /// identities are acceptable.
    ///
    /// # Errors
    /// Returns error if the armored data cannot be parsed.
    pub fn read_armored_keyring(data: &[u8], passphrase: Option<&SecretString>) -> Result<Vec<Self>> {
        let (keys, _headers) = SignedSecretKey::from_armor_many(Cursor::new(data))
            .map_err(|e| Error::Signing(e.to_string()))?;

        keys.map(|key| {
            let key = key.map_err(|e| Error::Signing(e.to_string()))?;
            key.verify().map_err(|e| Error::Signing(e.to_string()))?;
            Ok(Self {
                key,
                passphrase: passphrase.cloned(),
            })
        })
        .collect()
    }

    /// Produce an armored detached signature over `data`.
    ///
    /// # Errors
    /// Returns error if the key cannot be unlocked or signing fails.
    pub fn sign(&self, data: &[u8]) -> Result<String> {
        let mut config = SignatureConfig::v4(
            SignatureType::Binary,
            self.key.algorithm(),
            HashAlgorithm::SHA2_256,
        );
        config.hashed_subpackets = vec![
            Subpacket::regular(SubpacketData::SignatureCreationTime(Utc::now().trunc_subsecs(0))),
            Subpacket::regular(SubpacketData::Issuer(self.key.key_id())),
        ];

        let passphrase = self
            .passphrase
            .as_ref()
            .map(|p| p.expose_secret().to_string())
            .unwrap_or_default();
        let signature = config
            .sign(&self.key, || passphrase, Cursor::new(data))
            .map_err(|e| Error::Signing(e.to_string()))?;

        StandaloneSignature::new(signature)
            .to_armored_string(ArmorOptions::default())
            .map_err(|e| Error::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key.key_id())
            .finish_non_exhaustive()
    }
}
