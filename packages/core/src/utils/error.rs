// Типы ошибок прикладного уровня (хранилище, протокол, состояние чата)

use crate::error::CryptoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Private key is locked")]
    KeysLocked,
}

impl ChatError {
    /// Текст для показа пользователю; детали остаются в логах.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::Crypto(e) => e.user_message(),
            ChatError::KeysLocked => "unlock secure chat to continue",
            ChatError::InvalidInput(_) => "invalid request",
            _ => "something went wrong with secure chat",
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(error: serde_json::Error) -> Self {
        ChatError::SerializationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

// Для WASM-биндингов
#[cfg(target_arch = "wasm32")]
impl From<ChatError> for wasm_bindgen::JsValue {
    fn from(error: ChatError) -> Self {
        wasm_bindgen::JsValue::from_str(error.user_message())
    }
}
