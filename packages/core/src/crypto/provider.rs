//! Defines the CryptoProvider trait for crypto-agility.

use crate::error::CryptoError;
use core::fmt::Debug;
use zeroize::Zeroizing;

/// Trait that formalizes all cryptographic operations of an envelope suite.
/// The envelope code is generic over it, so a different asymmetric scheme or
/// content cipher can be plugged in without touching the wire orchestration.
pub trait CryptoProvider: Send + Sync + 'static {
    type PublicKey: Debug + Clone + Send + Sync + 'static;
    type PrivateKey: Clone + Send + Sync + 'static;

    /// Generates a new asymmetric key pair.
    fn generate_key_pair() -> Result<(Self::PrivateKey, Self::PublicKey), CryptoError>;

    /// Derives the public half from a private key.
    fn public_key_from_private(private_key: &Self::PrivateKey) -> Self::PublicKey;

    /// Parses a PEM-encoded public key.
    fn public_key_from_pem(pem: &str) -> Result<Self::PublicKey, CryptoError>;

    /// Parses a PEM-encoded private key.
    fn private_key_from_pem(pem: &str) -> Result<Self::PrivateKey, CryptoError>;

    /// Encodes a public key as PEM.
    fn public_key_to_pem(public_key: &Self::PublicKey) -> Result<String, CryptoError>;

    /// Encodes a private key as PEM.
    fn private_key_to_pem(private_key: &Self::PrivateKey) -> Result<Zeroizing<String>, CryptoError>;

    /// Size of the public modulus in bits.
    fn modulus_bits(public_key: &Self::PublicKey) -> usize;

    /// Generates a fresh symmetric content key.
    fn generate_content_key() -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Generates cryptographically secure random bytes of a specified length.
    fn generate_iv(len: usize) -> Result<Vec<u8>, CryptoError>;

    /// Length of the IV prepended to the content ciphertext.
    fn iv_length() -> usize;

    /// Encrypts content with the symmetric key.
    fn content_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts content with the symmetric key.
    fn content_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Wraps the content key for one recipient.
    fn wrap_key(public_key: &Self::PublicKey, content_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Recovers a wrapped content key.
    fn unwrap_key(private_key: &Self::PrivateKey, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Returns the suite id associated with this provider.
    fn suite_id() -> u16;
}
