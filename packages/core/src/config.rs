//! Централизованная конфигурация криптоядра чата
//!
//! Все константы и настройки должны быть определены здесь,
//! чтобы избежать хардкода по всему проекту.

use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // RSA
    // ============================================

    /// Длина модуля RSA (в битах)
    pub rsa_modulus_bits: usize,

    /// Публичная экспонента RSA
    pub rsa_public_exponent: u64,

    // ============================================
    // AES-256-CBC (шифрование содержимого)
    // ============================================

    /// Длина ключа AES-256 (в байтах)
    pub aes_key_length: usize,

    /// Длина IV для CBC (в байтах)
    pub aes_iv_length: usize,

    /// ID набора RSA-OAEP + AES-CBC
    pub envelope_suite_id: u16,

    // ============================================
    // ЗАПЕЧАТЫВАНИЕ ПРИВАТНОГО КЛЮЧА ПАРОЛЕМ
    // ============================================

    /// PBKDF2: количество итераций для деривации ключа из пароля
    pub pbkdf2_iterations: u32,

    /// Длина соли для PBKDF2 (в байтах)
    pub salt_length: usize,

    /// Длина nonce для AES-GCM (в байтах)
    pub gcm_nonce_length: usize,

    /// Минимальная длина пароля
    pub password_min_length: usize,

    // ============================================
    // ХРАНИЛИЩЕ
    // ============================================

    /// Префикс ключей в localStorage
    pub key_storage_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rsa_modulus_bits: 2048,
            rsa_public_exponent: 65537,

            aes_key_length: 32,
            aes_iv_length: 16,
            envelope_suite_id: 1,

            pbkdf2_iterations: 100_000,
            salt_length: 32,
            gcm_nonce_length: 12,
            password_min_length: 8,

            key_storage_prefix: "crm_chat_keys".to_string(),
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PBKDF2_ITERATIONS") {
            if let Ok(parsed) = val.parse() {
                config.pbkdf2_iterations = parsed;
            }
        }

        if let Ok(val) = std::env::var("KEY_STORAGE_PREFIX") {
            if !val.is_empty() {
                config.key_storage_prefix = val;
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Инициализировать глобальную конфигурацию со значениями по умолчанию
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG.set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG.set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG.set(config)
            .map_err(|_| "Config already initialized")
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }

    /// Ключ записи пользователя в localStorage
    pub fn storage_key(&self, user_id: &str) -> String {
        format!("{}:{}", self.key_storage_prefix, user_id)
    }
}
