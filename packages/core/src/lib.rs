// CRM Chat Core
// End-to-end encryption of chat messages: RSA-OAEP key wrapping + AES-256-CBC content

#![warn(clippy::all)]

// Модули
pub mod api;
pub mod config;
pub mod crypto;
pub mod protocol;
pub mod storage;
pub mod state;
pub mod utils;
pub mod error;

// Re-exports для удобства
pub use api::{decrypt_message, encrypt_message, generate_key_pair, has_keys, CryptoCore};
pub use crypto::{EncryptionEnvelope, KeyPair};
pub use error::CryptoError;

// WASM-specific bindings
#[cfg(target_arch = "wasm32")]
pub mod wasm;
