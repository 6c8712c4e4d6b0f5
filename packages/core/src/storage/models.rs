// Модели данных для хранилища ключей

use crate::crypto::master_key::SealedPrivateKey;
use serde::{Deserialize, Serialize};

/// Как лежит приватный ключ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrivateKeyRecord {
    /// Открытый PEM. Небезопасно: любой скрипт на странице может его прочитать.
    Plain { pem: String },
    /// PEM, зашифрованный паролем пользователя
    Sealed(SealedPrivateKey),
}

impl PrivateKeyRecord {
    pub fn is_sealed(&self) -> bool {
        matches!(self, PrivateKeyRecord::Sealed(_))
    }
}

/// Пара ключей пользователя в хранилище
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredKeyPair {
    pub user_id: String,
    pub public_key: String,
    pub private_key: PrivateKeyRecord,
    pub created_at: i64,
}
