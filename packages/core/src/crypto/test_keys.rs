// Общие ключи для unit-тестов: генерация RSA-2048 дорогая, делаем её один раз

use crate::crypto::provider::CryptoProvider;
use crate::crypto::suites::rsa_aes::RsaAesSuite;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::OnceLock;

pub struct TestKeys {
    pub alice_private: RsaPrivateKey,
    pub alice_public: RsaPublicKey,
    pub alice_public_pem: String,
    pub alice_private_pem: String,
    pub bob_private: RsaPrivateKey,
    pub bob_public: RsaPublicKey,
    pub bob_public_pem: String,
    pub bob_private_pem: String,
}

static KEYS: OnceLock<TestKeys> = OnceLock::new();

pub fn fixture() -> &'static TestKeys {
    KEYS.get_or_init(|| {
        let (alice_private, alice_public) = RsaAesSuite::generate_key_pair().unwrap();
        let (bob_private, bob_public) = RsaAesSuite::generate_key_pair().unwrap();
        TestKeys {
            alice_public_pem: RsaAesSuite::public_key_to_pem(&alice_public).unwrap(),
            alice_private_pem: RsaAesSuite::private_key_to_pem(&alice_private).unwrap().to_string(),
            bob_public_pem: RsaAesSuite::public_key_to_pem(&bob_public).unwrap(),
            bob_private_pem: RsaAesSuite::private_key_to_pem(&bob_private).unwrap().to_string(),
            alice_private,
            alice_public,
            bob_private,
            bob_public,
        }
    })
}
