// Запечатывание приватного ключа паролем (опционально)
// PBKDF2 для деривации ключа + AES-256-GCM для шифрования
//
// По умолчанию приватный ключ хранится открытым PEM. Этот модуль
// используется, только если вызывающий код явно передаёт пароль.

use crate::config::Config;
use crate::error::CryptoError;
use crate::utils::b64;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

// Compile-time константы для размеров массивов (должны совпадать с Config::default())
const SALT_LENGTH: usize = 32;
const KEY_LENGTH: usize = 32;

/// Приватный ключ, зашифрованный мастер-ключом из пароля.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPrivateKey {
    /// base64 соли PBKDF2
    pub salt: String,
    /// base64(nonce || ciphertext || tag)
    pub ciphertext: String,
    pub iterations: u32,
}

/// Деривировать мастер-ключ из пароля с использованием PBKDF2
///
/// # Arguments
/// * `password` - Пользовательский пароль
/// * `salt` - Соль (32 байта)
/// * `iterations` - Количество итераций PBKDF2
///
/// # Returns
/// 256-битный ключ для AES-256-GCM
pub fn derive_master_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LENGTH]>, CryptoError> {
    if salt.len() != Config::global().salt_length {
        return Err(CryptoError::KeySealingFailed(format!(
            "Invalid salt length: expected {}, got {}",
            Config::global().salt_length,
            salt.len()
        )));
    }

    if password.is_empty() {
        return Err(CryptoError::KeySealingFailed(
            "Password cannot be empty".to_string(),
        ));
    }

    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut *key);

    Ok(key)
}

/// Генерировать случайную соль
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Зашифровать PEM приватного ключа паролем
pub fn seal_private_key(private_key_pem: &str, password: &str) -> Result<SealedPrivateKey, CryptoError> {
    let salt = generate_salt();
    let iterations = Config::global().pbkdf2_iterations;
    let master_key = derive_master_key(password, &salt, iterations)?;
    let key: &[u8; KEY_LENGTH] = &master_key;
    let cipher = Aes256Gcm::new(key.into());

    let sealed = encrypt_data(&cipher, private_key_pem.as_bytes())?;

    Ok(SealedPrivateKey {
        salt: b64::encode(&salt),
        ciphertext: b64::encode(&sealed),
        iterations,
    })
}

/// Расшифровать PEM приватного ключа.
///
/// Неверный пароль и повреждённые данные неразличимы для вызывающего кода.
pub fn open_private_key(sealed: &SealedPrivateKey, password: &str) -> Result<Zeroizing<String>, CryptoError> {
    let salt = b64::decode(&sealed.salt).map_err(CryptoError::KeySealingFailed)?;
    let data = b64::decode(&sealed.ciphertext).map_err(CryptoError::KeySealingFailed)?;

    let master_key = derive_master_key(password, &salt, sealed.iterations)?;
    let key: &[u8; KEY_LENGTH] = &master_key;
    let cipher = Aes256Gcm::new(key.into());

    let plaintext = decrypt_data(&cipher, &data)?;
    let pem = String::from_utf8(plaintext.to_vec())
        .map_err(|_| CryptoError::KeySealingFailed("Sealed key is not valid UTF-8".to_string()))?;

    Ok(Zeroizing::new(pem))
}

/// Зашифровать данные с использованием AES-256-GCM
fn encrypt_data(cipher: &Aes256Gcm, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let nonce_length = Config::global().gcm_nonce_length;

    // Генерируем случайный nonce
    let mut nonce_bytes = vec![0u8; nonce_length];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, data)
        .map_err(|e| CryptoError::KeySealingFailed(format!("Encryption failed: {}", e)))?;

    // Комбинируем nonce + ciphertext
    let mut result = Vec::with_capacity(nonce_length + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Расшифровать данные с использованием AES-256-GCM
fn decrypt_data(cipher: &Aes256Gcm, data: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let nonce_length = Config::global().gcm_nonce_length;

    if data.len() < nonce_length {
        return Err(CryptoError::KeySealingFailed(
            "Invalid ciphertext: too short".to_string(),
        ));
    }

    let (nonce_bytes, ciphertext) = data.split_at(nonce_length);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::KeySealingFailed("Wrong password or corrupted key".to_string()))?;

    Ok(Zeroizing::new(plaintext))
}

/// Валидация силы пароля
///
/// Минимальные требования:
/// - Длина >= конфигурируемый минимум (по умолчанию 8 символов)
/// - Содержит буквы и цифры
pub fn validate_password(password: &str) -> Result<(), CryptoError> {
    let min_length = Config::global().password_min_length;
    if password.chars().count() < min_length {
        return Err(CryptoError::KeySealingFailed(format!(
            "Password must be at least {} characters long",
            min_length
        )));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_numeric());

    if !has_letter || !has_digit {
        return Err(CryptoError::KeySealingFailed(
            "Password must contain both letters and numbers".to_string(),
        ));
    }

    Ok(())
}
