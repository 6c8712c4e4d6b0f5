use thiserror::Error;

/// Ошибки криптографического ядра чата.
///
/// Первые три варианта видит вызывающий код; остальные возникают внутри
/// провайдера и сворачиваются в них на уровне конверта.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Failed to generate keys: {0}")]
    KeyGenerationFailed(String),
    #[error("Failed to encrypt message for recipient {recipient_id}")]
    RecipientEncryptionError { recipient_id: String, reason: String },
    /// Единое сообщение для всех причин: шаг, на котором упала расшифровка, не раскрывается.
    #[error("Decryption failed")]
    DecryptionFailed,
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("Private key sealing failed: {0}")]
    KeySealingFailed(String),
}

impl CryptoError {
    /// Текст, который можно показать пользователю.
    pub fn user_message(&self) -> &'static str {
        match self {
            CryptoError::KeyGenerationFailed(_) => "could not set up secure chat",
            CryptoError::RecipientEncryptionError { .. } | CryptoError::EncryptionFailed(_) => {
                "failed to encrypt message"
            }
            CryptoError::DecryptionFailed => "unable to decrypt this message",
            CryptoError::InvalidKey(_) => "invalid encryption key",
            CryptoError::KeySealingFailed(_) => "could not unlock secure chat keys",
        }
    }

    /// Id получателя, на котором оборвалось шифрование (только для диагностики).
    pub fn recipient_id(&self) -> Option<&str> {
        match self {
            CryptoError::RecipientEncryptionError { recipient_id, .. } => Some(recipient_id),
            _ => None,
        }
    }
}

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::KeyGenerationFailed(err.to_string()) // General RNG error
    }
}
