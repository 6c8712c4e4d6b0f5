//! Криптографические наборы (Crypto Suites)
//!
//! ## Доступные наборы
//!
//! ### RSA + AES (текущий)
//! - **Key pairs**: RSA-2048, e = 65537 (SPKI / PKCS#8 PEM)
//! - **Content**: AES-256-CBC, PKCS7, случайный 16-байтовый IV
//! - **Key wrap**: RSA-OAEP, SHA-256 + MGF1-SHA256
//! - **Suite ID**: 1
//!
//! Формат совпадает с реализацией бэкенда, менять его можно только
//! вместе с сервером.
//!
//! ```rust,no_run
//! use crm_chat_core::crypto::suites::rsa_aes::RsaAesSuite;
//! use crm_chat_core::crypto::provider::CryptoProvider;
//!
//! let (private_key, public_key) = RsaAesSuite::generate_key_pair()?;
//! # Ok::<(), crm_chat_core::error::CryptoError>(())
//! ```

pub mod rsa_aes;
