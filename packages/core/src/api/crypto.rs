// Фасад шифрования сообщений чата
//
// Все операции синхронные и не держат общего состояния, поэтому их можно
// вызывать параллельно. Для desktop есть async-обёртки, которые уносят
// тяжёлую работу RSA с основного потока.

use crate::crypto::envelope::{self, EncryptionEnvelope};
use crate::crypto::keys::{self, KeyPair};
use crate::crypto::suites::rsa_aes::RsaAesSuite;
use crate::crypto::CryptoProvider;
use crate::error::CryptoError;
use std::marker::PhantomData;

/// Набор, совместимый с бэкендом
pub type DefaultSuite = RsaAesSuite;

/// Служба шифрования сообщений, параметризованная криптонабором.
pub struct CryptoCore<P: CryptoProvider = DefaultSuite> {
    _phantom: PhantomData<P>,
}

impl<P: CryptoProvider> CryptoCore<P> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    pub fn generate_key_pair(&self) -> Result<KeyPair, CryptoError> {
        keys::generate_key_pair::<P>()
    }

    pub fn encrypt_message<I, K, V>(
        &self,
        content: &str,
        recipient_public_keys: I,
    ) -> Result<EncryptionEnvelope, CryptoError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        envelope::encrypt_message::<P, I, K, V>(content, recipient_public_keys)
    }

    pub fn decrypt_message(
        &self,
        encrypted_content_b64: &str,
        encrypted_aes_key_b64: &str,
        private_key_pem: &str,
    ) -> Result<String, CryptoError> {
        envelope::decrypt_message::<P>(encrypted_content_b64, encrypted_aes_key_b64, private_key_pem)
    }

    pub fn has_keys(&self, public_key: Option<&str>, private_key: Option<&str>) -> bool {
        keys::has_keys(public_key, private_key)
    }

    pub fn suite_id(&self) -> u16 {
        P::suite_id()
    }
}

impl<P: CryptoProvider> Default for CryptoCore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CryptoProvider> Clone for CryptoCore<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

// ============================================================================
// Функции с набором по умолчанию
// ============================================================================

/// RSA-2048 пара ключей в PEM
pub fn generate_key_pair() -> Result<KeyPair, CryptoError> {
    keys::generate_key_pair::<DefaultSuite>()
}

/// Зашифровать сообщение для получателей `{user_id: public_key_pem}`
pub fn encrypt_message<I, K, V>(content: &str, recipient_public_keys: I) -> Result<EncryptionEnvelope, CryptoError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    envelope::encrypt_message::<DefaultSuite, I, K, V>(content, recipient_public_keys)
}

/// Расшифровать сообщение своим приватным ключом
pub fn decrypt_message(
    encrypted_content_b64: &str,
    encrypted_aes_key_b64: &str,
    private_key_pem: &str,
) -> Result<String, CryptoError> {
    envelope::decrypt_message::<DefaultSuite>(encrypted_content_b64, encrypted_aes_key_b64, private_key_pem)
}

pub fn has_keys(public_key: Option<&str>, private_key: Option<&str>) -> bool {
    keys::has_keys(public_key, private_key)
}

// ============================================================================
// Desktop: выполнение вне основного потока
// ============================================================================

#[cfg(feature = "desktop")]
mod blocking {
    use super::*;
    use std::collections::BTreeMap;

    fn join_error(e: tokio::task::JoinError) -> CryptoError {
        CryptoError::EncryptionFailed(format!("Crypto task failed: {}", e))
    }

    pub async fn generate_key_pair_async() -> Result<KeyPair, CryptoError> {
        tokio::task::spawn_blocking(generate_key_pair)
            .await
            .map_err(|e| CryptoError::KeyGenerationFailed(format!("Crypto task failed: {}", e)))?
    }

    pub async fn encrypt_message_async(
        content: String,
        recipient_public_keys: BTreeMap<String, String>,
    ) -> Result<EncryptionEnvelope, CryptoError> {
        tokio::task::spawn_blocking(move || encrypt_message(&content, recipient_public_keys))
            .await
            .map_err(join_error)?
    }

    pub async fn decrypt_message_async(
        encrypted_content_b64: String,
        encrypted_aes_key_b64: String,
        private_key_pem: String,
    ) -> Result<String, CryptoError> {
        tokio::task::spawn_blocking(move || {
            decrypt_message(&encrypted_content_b64, &encrypted_aes_key_b64, &private_key_pem)
        })
        .await
        .map_err(|_| CryptoError::DecryptionFailed)?
    }
}

#[cfg(feature = "desktop")]
pub use blocking::{decrypt_message_async, encrypt_message_async, generate_key_pair_async};
