use crate::config::Config;
use crate::crypto::provider::CryptoProvider;
use crate::error::CryptoError;
use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand_core::RngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// RSA-2048 / OAEP-SHA256 key wrapping with AES-256-CBC (PKCS7) content encryption.
pub struct RsaAesSuite;

impl CryptoProvider for RsaAesSuite {
    type PublicKey = RsaPublicKey;
    type PrivateKey = RsaPrivateKey;

    fn generate_key_pair() -> Result<(Self::PrivateKey, Self::PublicKey), CryptoError> {
        let config = Config::global();
        let exponent = BigUint::from(config.rsa_public_exponent);
        let private_key = RsaPrivateKey::new_with_exp(&mut OsRng, config.rsa_modulus_bits, &exponent)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        let public_key = private_key.to_public_key();
        Ok((private_key, public_key))
    }

    fn public_key_from_private(private_key: &Self::PrivateKey) -> Self::PublicKey {
        private_key.to_public_key()
    }

    fn public_key_from_pem(pem: &str) -> Result<Self::PublicKey, CryptoError> {
        let pem = pem.trim();
        // SPKI ("PUBLIC KEY") первым, затем PKCS#1 ("RSA PUBLIC KEY")
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| CryptoError::InvalidKey(format!("Invalid public key PEM: {}", e)))
    }

    fn private_key_from_pem(pem: &str) -> Result<Self::PrivateKey, CryptoError> {
        let pem = pem.trim();
        RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| CryptoError::InvalidKey(format!("Invalid private key PEM: {}", e)))
    }

    fn public_key_to_pem(public_key: &Self::PublicKey) -> Result<String, CryptoError> {
        public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGenerationFailed(format!("Public key encoding failed: {}", e)))
    }

    fn private_key_to_pem(private_key: &Self::PrivateKey) -> Result<Zeroizing<String>, CryptoError> {
        private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGenerationFailed(format!("Private key encoding failed: {}", e)))
    }

    fn modulus_bits(public_key: &Self::PublicKey) -> usize {
        public_key.n().bits()
    }

    fn generate_content_key() -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let mut key = Zeroizing::new(vec![0u8; Config::global().aes_key_length]);
        OsRng.try_fill_bytes(&mut key)?;
        Ok(key)
    }

    fn generate_iv(len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut iv = vec![0u8; len];
        OsRng.try_fill_bytes(&mut iv)?;
        Ok(iv)
    }

    fn iv_length() -> usize {
        Config::global().aes_iv_length
    }

    fn content_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(|e| CryptoError::EncryptionFailed(format!("Invalid AES key or IV: {}", e)))?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    fn content_decrypt(
        key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| CryptoError::DecryptionFailed)?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    fn wrap_key(public_key: &Self::PublicKey, content_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), content_key)
            .map_err(|e| CryptoError::EncryptionFailed(format!("RSA-OAEP wrap failed: {}", e)))
    }

    fn unwrap_key(
        private_key: &Self::PrivateKey,
        wrapped: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        private_key
            .decrypt(Oaep::new::<Sha256>(), wrapped)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    fn suite_id() -> u16 {
        Config::global().envelope_suite_id
    }
}
