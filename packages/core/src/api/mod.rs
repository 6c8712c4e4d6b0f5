// Публичный API криптоядра чата
// Высокоуровневые методы для путей отправки и получения сообщений

pub mod crypto;
pub mod messaging;

pub use crypto::{decrypt_message, encrypt_message, generate_key_pair, has_keys, CryptoCore, DefaultSuite};
