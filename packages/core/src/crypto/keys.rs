// Пары ключей пользователя чата
//
// Приватный ключ хранится вызывающим кодом как есть (PEM). В браузере это
// localStorage без защиты: небезопасное демо-поведение, см. master_key для
// опционального запечатывания паролем.

use crate::crypto::provider::CryptoProvider;
use crate::error::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PEM-пара ключей: публичный в SPKI, приватный в PKCS#8.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Сгенерировать новую пару ключей
pub fn generate_key_pair<P: CryptoProvider>() -> Result<KeyPair, CryptoError> {
    use tracing::debug;

    let (private_key, public_key) = P::generate_key_pair()?;
    let public_pem = P::public_key_to_pem(&public_key)?;
    let private_pem = P::private_key_to_pem(&private_key)?;

    debug!(
        "Generated key pair, suite_id={}, modulus_bits={}",
        P::suite_id(),
        P::modulus_bits(&public_key)
    );

    Ok(KeyPair {
        public_key: public_pem,
        private_key: private_pem.to_string(),
    })
}

/// Оба ключа присутствуют и не пустые
pub fn has_keys(public_key: Option<&str>, private_key: Option<&str>) -> bool {
    matches!((public_key, private_key), (Some(public), Some(private)) if !public.is_empty() && !private.is_empty())
}

/// Размер модуля публичного ключа в битах
pub fn modulus_bits<P: CryptoProvider>(public_key_pem: &str) -> Result<usize, CryptoError> {
    let public_key = P::public_key_from_pem(public_key_pem)?;
    Ok(P::modulus_bits(&public_key))
}

/// Проверить, что приватный ключ является парой к публичному
pub fn keys_match<P: CryptoProvider>(public_key_pem: &str, private_key_pem: &str) -> bool
where
    P::PublicKey: PartialEq,
{
    match (P::public_key_from_pem(public_key_pem), P::private_key_from_pem(private_key_pem)) {
        (Ok(public), Ok(private)) => P::public_key_from_private(&private) == public,
        _ => false,
    }
}
