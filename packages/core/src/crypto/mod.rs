//! Криптографический модуль чата
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Chat send / receive paths (api, state)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Envelope (encrypt / decrypt)             │
//! │  - Один AES-ключ и IV на сообщение                          │
//! │  - Ключ оборачивается для каждого получателя                │
//! │  - Единая ошибка расшифровки                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (Crypto-Agility)                │
//! │  - Key pairs (RSA-2048, e = 65537, PEM)                     │
//! │  - Content (AES-256-CBC, PKCS7)                             │
//! │  - Key wrap (RSA-OAEP, SHA-256 / MGF1-SHA256)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! - [`provider`]: CryptoProvider trait для crypto-agility
//! - [`suites`]: Реализации CryptoProvider (RSA + AES)
//! - [`envelope`]: шифрование сообщения для набора получателей
//! - [`keys`]: пары ключей, проверка наличия ключей
//! - [`master_key`]: опциональное запечатывание приватного ключа паролем

pub mod provider;

pub mod suites;

pub mod envelope;

pub mod keys;

pub mod master_key;

#[cfg(test)]
pub(crate) mod test_keys;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use envelope::EncryptionEnvelope;
pub use keys::KeyPair;
pub use provider::CryptoProvider;
