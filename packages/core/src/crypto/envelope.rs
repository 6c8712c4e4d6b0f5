//! Конверт сообщения: содержимое шифруется один раз AES-ключом,
//! ключ оборачивается отдельно для каждого получателя.
//!
//! Формат на проводе (совпадает с бэкендом):
//!
//! ```text
//! encrypted_content       = base64( IV[16] || AES-256-CBC(PKCS7)(plaintext) )
//! encrypted_keys[user_id] = base64( RSA-OAEP-SHA256(aes_key[32]) )
//! ```

use crate::crypto::provider::CryptoProvider;
use crate::error::CryptoError;
use crate::utils::b64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Результат шифрования сообщения для набора получателей.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionEnvelope {
    pub encrypted_content: String,
    pub encrypted_keys: BTreeMap<String, String>,
}

impl EncryptionEnvelope {
    /// Обёрнутый ключ для конкретного получателя
    pub fn key_for(&self, recipient_id: &str) -> Option<&str> {
        self.encrypted_keys.get(recipient_id).map(String::as_str)
    }

    pub fn recipient_count(&self) -> usize {
        self.encrypted_keys.len()
    }
}

/// Зашифровать сообщение для всех получателей.
///
/// Пустой набор получателей даёт конверт без ключей: он корректен, но
/// прочитать его никто не сможет. Отсекать такой случай должен вызывающий код.
///
/// Если хотя бы один публичный ключ не разбирается, операция целиком
/// завершается `RecipientEncryptionError`; частичный конверт не возвращается.
pub fn encrypt_message<P, I, K, V>(
    content: &str,
    recipient_public_keys: I,
) -> Result<EncryptionEnvelope, CryptoError>
where
    P: CryptoProvider,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    use tracing::{debug, warn};

    let content_key = P::generate_content_key().map_err(encryption_failure)?;
    let iv = P::generate_iv(P::iv_length()).map_err(encryption_failure)?;
    let ciphertext = P::content_encrypt(&content_key, &iv, content.as_bytes())?;

    let mut payload = Vec::with_capacity(iv.len() + ciphertext.len());
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&ciphertext);

    let mut encrypted_keys = BTreeMap::new();
    for (recipient_id, public_key_pem) in recipient_public_keys {
        let recipient_id = recipient_id.into();
        let wrapped = P::public_key_from_pem(public_key_pem.as_ref())
            .and_then(|public_key| P::wrap_key(&public_key, &content_key));

        match wrapped {
            Ok(wrapped) => {
                encrypted_keys.insert(recipient_id, b64::encode(&wrapped));
            }
            Err(e) => {
                warn!("Key wrapping failed for recipient {}: {}", recipient_id, e);
                return Err(CryptoError::RecipientEncryptionError {
                    recipient_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Encrypted message: {} content bytes, {} recipients",
        payload.len(),
        encrypted_keys.len()
    );

    Ok(EncryptionEnvelope {
        encrypted_content: b64::encode(&payload),
        encrypted_keys,
    })
}

/// Сбой ГСЧ при шифровании: для пользователя это ошибка отправки,
/// а не настройки ключей.
fn encryption_failure(error: CryptoError) -> CryptoError {
    match error {
        CryptoError::KeyGenerationFailed(reason) => CryptoError::EncryptionFailed(reason),
        other => other,
    }
}

/// Расшифровать сообщение своим приватным ключом.
///
/// Любая ошибка (base64, неверный ключ, паддинг, UTF-8) возвращается как
/// `DecryptionFailed` без указания шага.
pub fn decrypt_message<P: CryptoProvider>(
    encrypted_content_b64: &str,
    encrypted_aes_key_b64: &str,
    private_key_pem: &str,
) -> Result<String, CryptoError> {
    open_envelope::<P>(encrypted_content_b64, encrypted_aes_key_b64, private_key_pem)
        .ok_or(CryptoError::DecryptionFailed)
}

fn open_envelope<P: CryptoProvider>(
    encrypted_content_b64: &str,
    encrypted_aes_key_b64: &str,
    private_key_pem: &str,
) -> Option<String> {
    let private_key = P::private_key_from_pem(private_key_pem).ok()?;

    let wrapped_key = b64::decode(encrypted_aes_key_b64).ok()?;
    let content_key = P::unwrap_key(&private_key, &wrapped_key).ok()?;

    let payload = b64::decode(encrypted_content_b64).ok()?;
    let iv_length = P::iv_length();
    if payload.len() < iv_length {
        return None;
    }
    let (iv, ciphertext) = payload.split_at(iv_length);

    let plaintext = P::content_decrypt(&content_key, iv, ciphertext).ok()?;
    String::from_utf8(plaintext.to_vec()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suites::rsa_aes::RsaAesSuite;
    use crate::crypto::test_keys::fixture;

    fn single(id: &str, pem: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(id.to_string(), pem.to_string())])
    }

    #[test]
    fn test_roundtrip_single_recipient() {
        let keys = fixture();
        let envelope =
            encrypt_message::<RsaAesSuite, _, _, _>("Visa file ready", single("42", &keys.alice_public_pem)).unwrap();

        let plaintext = decrypt_message::<RsaAesSuite>(
            &envelope.encrypted_content,
            envelope.key_for("42").unwrap(),
            &keys.alice_private_pem,
        )
        .unwrap();
        assert_eq!(plaintext, "Visa file ready");
    }

    #[test]
    fn test_content_layout() {
        let keys = fixture();
        let envelope =
            encrypt_message::<RsaAesSuite, _, _, _>("hi", single("1", &keys.alice_public_pem)).unwrap();

        let payload = b64::decode(&envelope.encrypted_content).unwrap();
        // IV + один блок
        assert_eq!(payload.len(), 16 + 16);

        let wrapped = b64::decode(envelope.key_for("1").unwrap()).unwrap();
        assert_eq!(wrapped.len(), 256);
    }

    #[test]
    fn test_accepts_borrowed_map_entries() {
        let keys = fixture();
        let recipients = std::collections::HashMap::from([
            ("7".to_string(), keys.alice_public_pem.clone()),
            ("8".to_string(), keys.bob_public_pem.clone()),
        ]);
        let envelope = encrypt_message::<RsaAesSuite, _, _, _>("ok", &recipients).unwrap();
        assert_eq!(envelope.recipient_count(), 2);
    }

    #[test]
    fn test_zero_recipients_gives_empty_key_map() {
        let envelope =
            encrypt_message::<RsaAesSuite, _, _, _>("nobody", BTreeMap::<String, String>::new()).unwrap();
        assert!(envelope.encrypted_keys.is_empty());
        assert!(!envelope.encrypted_content.is_empty());
    }

    #[test]
    fn test_bad_recipient_aborts_whole_call() {
        let keys = fixture();
        let recipients = vec![
            ("1", keys.alice_public_pem.as_str()),
            ("2", "-----BEGIN PUBLIC KEY-----\ngarbage\n-----END PUBLIC KEY-----"),
            ("3", keys.bob_public_pem.as_str()),
        ];

        let err = encrypt_message::<RsaAesSuite, _, _, _>("hello", recipients).unwrap_err();
        assert_eq!(err.recipient_id(), Some("2"));
        assert!(matches!(err, CryptoError::RecipientEncryptionError { .. }));
    }

    #[test]
    fn test_short_content_is_rejected() {
        let keys = fixture();
        let envelope =
            encrypt_message::<RsaAesSuite, _, _, _>("x", single("1", &keys.alice_public_pem)).unwrap();
        let short = b64::encode(&[0u8; 10]);

        let result = decrypt_message::<RsaAesSuite>(&short, envelope.key_for("1").unwrap(), &keys.alice_private_pem);
        assert_eq!(result.unwrap_err(), CryptoError::DecryptionFailed);
    }

    #[test]
    fn test_every_failure_looks_the_same() {
        let keys = fixture();
        let envelope =
            encrypt_message::<RsaAesSuite, _, _, _>("same error", single("1", &keys.alice_public_pem)).unwrap();
        let key = envelope.key_for("1").unwrap();

        let failures = [
            decrypt_message::<RsaAesSuite>("%%%", key, &keys.alice_private_pem),
            decrypt_message::<RsaAesSuite>(&envelope.encrypted_content, "%%%", &keys.alice_private_pem),
            decrypt_message::<RsaAesSuite>(&envelope.encrypted_content, key, &keys.bob_private_pem),
            decrypt_message::<RsaAesSuite>(&envelope.encrypted_content, key, "not a pem"),
        ];

        for failure in failures {
            let err = failure.unwrap_err();
            assert_eq!(err, CryptoError::DecryptionFailed);
            assert_eq!(err.to_string(), "Decryption failed");
        }
    }

    #[test]
    fn test_wrapped_key_of_wrong_length_fails() {
        let keys = fixture();
        let envelope =
            encrypt_message::<RsaAesSuite, _, _, _>("payload", single("1", &keys.alice_public_pem)).unwrap();

        // 16-байтовый ключ расшифруется RSA, но не подойдёт для AES-256
        let short_key = RsaAesSuite::wrap_key(&keys.alice_public, &[3u8; 16]).unwrap();
        let result = decrypt_message::<RsaAesSuite>(
            &envelope.encrypted_content,
            &b64::encode(&short_key),
            &keys.alice_private_pem,
        );
        assert_eq!(result.unwrap_err(), CryptoError::DecryptionFailed);
    }

    #[test]
    fn test_invalid_utf8_plaintext_fails() {
        let keys = fixture();
        let content_key = [4u8; 32];
        let iv = [5u8; 16];
        let ciphertext = RsaAesSuite::content_encrypt(&content_key, &iv, &[0xff, 0xfe, 0xfd]).unwrap();

        let mut payload = iv.to_vec();
        payload.extend_from_slice(&ciphertext);
        let wrapped = RsaAesSuite::wrap_key(&keys.alice_public, &content_key).unwrap();

        let result = decrypt_message::<RsaAesSuite>(
            &b64::encode(&payload),
            &b64::encode(&wrapped),
            &keys.alice_private_pem,
        );
        assert_eq!(result.unwrap_err(), CryptoError::DecryptionFailed);
    }

    #[test]
    fn test_envelope_json_field_names() {
        let envelope = EncryptionEnvelope {
            encrypted_content: "Y29udGVudA==".into(),
            encrypted_keys: BTreeMap::from([("42".to_string(), "a2V5".to_string())]),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            json,
            r#"{"encrypted_content":"Y29udGVudA==","encrypted_keys":{"42":"a2V5"}}"#
        );
    }

    #[test]
    fn test_rng_failure_while_encrypting_is_encryption_error() {
        let rng_error = rand::Error::new(std::io::Error::new(std::io::ErrorKind::Other, "entropy unavailable"));
        let mapped = encryption_failure(CryptoError::from(rng_error));

        assert!(matches!(mapped, CryptoError::EncryptionFailed(_)));
        assert_eq!(mapped.user_message(), "failed to encrypt message");
        assert_eq!(encryption_failure(CryptoError::DecryptionFailed), CryptoError::DecryptionFailed);
    }
}
