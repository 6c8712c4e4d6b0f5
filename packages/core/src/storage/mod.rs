// Модуль хранилища ключей (localStorage для WASM, память для остального)

#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod memory;
pub mod models;

use crate::storage::models::StoredKeyPair;
use crate::utils::error::Result;

/// Где живут ключи пользователя. Решает вызывающий код, криптоядро
/// собственного хранилища не имеет.
pub trait KeyStorage {
    fn save_key_pair(&mut self, keys: StoredKeyPair) -> Result<()>;
    fn load_key_pair(&self, user_id: &str) -> Result<Option<StoredKeyPair>>;
    fn delete_key_pair(&mut self, user_id: &str) -> Result<()>;
}
