// Хранилище ключей в window.localStorage (только WASM)
//
// Приватный ключ без пароля лежит здесь открытым текстом. Это повторяет
// поведение веб-клиента и небезопасно: используйте Sealed-запись, если
// продукт требует защиты ключей.

use crate::config::Config;
use crate::storage::models::StoredKeyPair;
use crate::storage::KeyStorage;
use crate::utils::error::{ChatError, Result};
use web_sys::Storage;

pub struct LocalKeyStorage {
    storage: Storage,
}

impl LocalKeyStorage {
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::StorageError("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|_| ChatError::StorageError("localStorage is not accessible".to_string()))?
            .ok_or_else(|| ChatError::StorageError("localStorage is not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyStorage for LocalKeyStorage {
    fn save_key_pair(&mut self, keys: StoredKeyPair) -> Result<()> {
        let key = Config::global().storage_key(&keys.user_id);
        let value = serde_json::to_string(&keys)?;
        self.storage
            .set_item(&key, &value)
            .map_err(|_| ChatError::StorageError(format!("Failed to write {}", key)))
    }

    fn load_key_pair(&self, user_id: &str) -> Result<Option<StoredKeyPair>> {
        let key = Config::global().storage_key(user_id);
        let value = self
            .storage
            .get_item(&key)
            .map_err(|_| ChatError::StorageError(format!("Failed to read {}", key)))?;
        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn delete_key_pair(&mut self, user_id: &str) -> Result<()> {
        let key = Config::global().storage_key(user_id);
        self.storage
            .remove_item(&key)
            .map_err(|_| ChatError::StorageError(format!("Failed to remove {}", key)))
    }
}
