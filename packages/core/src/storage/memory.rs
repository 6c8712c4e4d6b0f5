// In-memory storage для тестов и non-WASM платформ

use crate::storage::models::StoredKeyPair;
use crate::storage::KeyStorage;
use crate::utils::error::Result;
use std::collections::HashMap;

/// In-memory хранилище
pub struct MemoryStorage {
    key_pairs: HashMap<String, StoredKeyPair>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            key_pairs: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.key_pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_pairs.is_empty()
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.key_pairs.clear();
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStorage for MemoryStorage {
    fn save_key_pair(&mut self, keys: StoredKeyPair) -> Result<()> {
        self.key_pairs.insert(keys.user_id.clone(), keys);
        Ok(())
    }

    fn load_key_pair(&self, user_id: &str) -> Result<Option<StoredKeyPair>> {
        Ok(self.key_pairs.get(user_id).cloned())
    }

    fn delete_key_pair(&mut self, user_id: &str) -> Result<()> {
        self.key_pairs.remove(user_id);
        Ok(())
    }
}
