// Состояние защищённого чата одного пользователя
//
// Вместо глобального стора: объект владеет ключами пользователя и
// хранилищем, а UI подписывается на события явно.

use crate::api::crypto::DefaultSuite;
use crate::api::messaging;
use crate::crypto::keys;
use crate::crypto::master_key;
use crate::crypto::CryptoProvider;
use crate::protocol::messages::{DecryptedChatMessage, IncomingChatMessage, OutgoingChatMessage};
use crate::storage::models::{PrivateKeyRecord, StoredKeyPair};
use crate::storage::KeyStorage;
use crate::utils::error::{ChatError, Result};
use crate::utils::time::current_timestamp;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use zeroize::Zeroizing;

/// События для подписчиков
///
/// В JS уходят объектом с полем `type`: `{ "type": "message_opened", "message_id": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Ключи готовы; `generated` = пара создана только что
    KeysReady { generated: bool },
    KeysCleared,
    MessageSealed { conversation_id: String, client_message_id: String },
    MessageOpened { message_id: String },
    DecryptionFailed { message_id: String },
    Error { message: String },
}

pub type SubscriptionId = u64;

type Listener = Box<dyn Fn(&ChatEvent)>;

pub struct SecureChat<S: KeyStorage, P: CryptoProvider = DefaultSuite> {
    user_id: String,
    storage: S,
    public_key: Option<String>,
    /// Открытый приватный ключ; None, пока ключи не загружены или заперты
    private_key: Option<Zeroizing<String>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription_id: SubscriptionId,
    _phantom: PhantomData<P>,
}

impl<S: KeyStorage, P: CryptoProvider> SecureChat<S, P> {
    pub fn new(user_id: impl Into<String>, storage: S) -> Self {
        Self {
            user_id: user_id.into(),
            storage,
            public_key: None,
            private_key: None,
            listeners: Vec::new(),
            next_subscription_id: 1,
            _phantom: PhantomData,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn has_keys(&self) -> bool {
        keys::has_keys(
            self.public_key.as_deref(),
            self.private_key.as_ref().map(|pem| pem.as_str()),
        )
    }

    // === Ключи ===

    /// Загрузить ключи из хранилища или создать новую пару.
    ///
    /// Новая пара сохраняется без пароля (открытым PEM). Возвращает
    /// публичный ключ для публикации на сервере.
    pub fn ensure_keys(&mut self) -> Result<String> {
        use tracing::debug;

        if let (Some(public), true) = (&self.public_key, self.private_key.is_some()) {
            return Ok(public.clone());
        }

        match self.storage.load_key_pair(&self.user_id)? {
            Some(stored) => {
                let pem = match stored.private_key {
                    PrivateKeyRecord::Plain { pem } => Zeroizing::new(pem),
                    PrivateKeyRecord::Sealed(_) => {
                        self.public_key = Some(stored.public_key);
                        return Err(ChatError::KeysLocked);
                    }
                };
                debug!("Loaded key pair for user {}", self.user_id);
                self.install_keys(stored.public_key, pem, false)
            }
            None => {
                let pair = self.generate_or_report()?;
                self.storage.save_key_pair(StoredKeyPair {
                    user_id: self.user_id.clone(),
                    public_key: pair.public_key.clone(),
                    private_key: PrivateKeyRecord::Plain { pem: pair.private_key.clone() },
                    created_at: current_timestamp(),
                })?;
                debug!("Generated key pair for user {}", self.user_id);
                self.install_keys(pair.public_key, Zeroizing::new(pair.private_key), true)
            }
        }
    }

    /// То же, но новая пара запечатывается паролем, а существующая
    /// запечатанная открывается им.
    pub fn ensure_keys_with_password(&mut self, password: &str) -> Result<String> {
        match self.storage.load_key_pair(&self.user_id)? {
            Some(_) => self.unlock(password),
            None => {
                master_key::validate_password(password)?;
                let pair = self.generate_or_report()?;
                let sealed = master_key::seal_private_key(&pair.private_key, password)?;
                self.storage.save_key_pair(StoredKeyPair {
                    user_id: self.user_id.clone(),
                    public_key: pair.public_key.clone(),
                    private_key: PrivateKeyRecord::Sealed(sealed),
                    created_at: current_timestamp(),
                })?;
                self.install_keys(pair.public_key, Zeroizing::new(pair.private_key), true)
            }
        }
    }

    /// Открыть сохранённый приватный ключ
    pub fn unlock(&mut self, password: &str) -> Result<String> {
        let stored = self
            .storage
            .load_key_pair(&self.user_id)?
            .ok_or_else(|| ChatError::NotFound(format!("No keys stored for user {}", self.user_id)))?;

        let pem = match &stored.private_key {
            PrivateKeyRecord::Plain { pem } => Zeroizing::new(pem.clone()),
            PrivateKeyRecord::Sealed(sealed) => master_key::open_private_key(sealed, password)?,
        };
        self.install_keys(stored.public_key, pem, false)
    }

    /// Забыть открытый приватный ключ (хранилище не трогается)
    pub fn lock(&mut self) {
        self.private_key = None;
    }

    /// Удалить ключи пользователя. Старые сообщения после этого не прочитать.
    pub fn reset_keys(&mut self) -> Result<()> {
        self.storage.delete_key_pair(&self.user_id)?;
        self.public_key = None;
        self.private_key = None;
        self.notify(&ChatEvent::KeysCleared);
        Ok(())
    }

    fn generate_or_report(&self) -> Result<keys::KeyPair> {
        keys::generate_key_pair::<P>().map_err(|e| {
            self.notify(&ChatEvent::Error {
                message: e.user_message().to_string(),
            });
            ChatError::from(e)
        })
    }

    fn install_keys(&mut self, public_key: String, private_key: Zeroizing<String>, generated: bool) -> Result<String> {
        self.public_key = Some(public_key.clone());
        self.private_key = Some(private_key);
        self.notify(&ChatEvent::KeysReady { generated });
        Ok(public_key)
    }

    // === Сообщения ===

    /// Зашифровать сообщение для участников беседы.
    ///
    /// Собственный публичный ключ добавляется к получателям, чтобы
    /// отправитель мог читать свою историю.
    pub fn send(
        &self,
        conversation_id: &str,
        content: &str,
        recipient_public_keys: &BTreeMap<String, String>,
    ) -> Result<OutgoingChatMessage> {
        let mut recipients = recipient_public_keys.clone();
        if let Some(own) = &self.public_key {
            recipients.entry(self.user_id.clone()).or_insert_with(|| own.clone());
        }

        match messaging::seal_outgoing::<P, _, _, _>(conversation_id, content, recipients) {
            Ok(outgoing) => {
                self.notify(&ChatEvent::MessageSealed {
                    conversation_id: outgoing.conversation_id.clone(),
                    client_message_id: outgoing.client_message_id.clone(),
                });
                Ok(outgoing)
            }
            Err(e) => {
                self.notify(&ChatEvent::Error {
                    message: e.user_message().to_string(),
                });
                Err(e)
            }
        }
    }

    /// Расшифровать входящее сообщение
    pub fn receive(&self, message: &IncomingChatMessage) -> Result<DecryptedChatMessage> {
        let private_key = self.private_key.as_ref().ok_or(ChatError::KeysLocked)?;

        match messaging::open_incoming::<P>(message, &self.user_id, private_key) {
            Ok(decrypted) => {
                self.notify(&ChatEvent::MessageOpened {
                    message_id: decrypted.id.clone(),
                });
                Ok(decrypted)
            }
            Err(e) => {
                self.notify(&ChatEvent::DecryptionFailed {
                    message_id: message.id.clone(),
                });
                Err(e)
            }
        }
    }

    // === Подписки ===

    pub fn subscribe(&mut self, listener: impl Fn(&ChatEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&self, event: &ChatEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::test_keys::fixture;
    use crate::error::CryptoError;
    use crate::storage::memory::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Chat = SecureChat<MemoryStorage>;

    /// Хранилище с уже положенной парой, чтобы не генерировать RSA в каждом тесте
    fn storage_with_alice(user_id: &str) -> MemoryStorage {
        let keys = fixture();
        let mut storage = MemoryStorage::new();
        storage
            .save_key_pair(StoredKeyPair {
                user_id: user_id.to_string(),
                public_key: keys.alice_public_pem.clone(),
                private_key: PrivateKeyRecord::Plain {
                    pem: keys.alice_private_pem.clone(),
                },
                created_at: 0,
            })
            .unwrap();
        storage
    }

    fn recorder(chat: &mut Chat) -> Rc<RefCell<Vec<ChatEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        chat.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    fn to_incoming(outgoing: &OutgoingChatMessage, sender_id: &str) -> IncomingChatMessage {
        IncomingChatMessage {
            id: "srv-1".to_string(),
            conversation_id: outgoing.conversation_id.clone(),
            sender_id: sender_id.to_string(),
            encrypted_content: outgoing.encrypted_content.clone(),
            encrypted_key: None,
            encrypted_keys: outgoing.encrypted_keys.clone(),
            created_at: None,
        }
    }

    #[test]
    fn test_ensure_keys_loads_stored_pair() {
        let mut chat = Chat::new("42", storage_with_alice("42"));
        let events = recorder(&mut chat);

        assert!(!chat.has_keys());
        let public = chat.ensure_keys().unwrap();

        assert_eq!(public, fixture().alice_public_pem);
        assert!(chat.has_keys());
        assert_eq!(events.borrow().as_slice(), &[ChatEvent::KeysReady { generated: false }]);
    }

    #[test]
    fn test_ensure_keys_generates_and_persists() {
        let mut chat = Chat::new("7", MemoryStorage::new());
        let events = recorder(&mut chat);

        let public = chat.ensure_keys().unwrap();
        let stored = chat.storage().load_key_pair("7").unwrap().unwrap();

        assert_eq!(stored.public_key, public);
        assert!(!stored.private_key.is_sealed());
        assert_eq!(events.borrow().as_slice(), &[ChatEvent::KeysReady { generated: true }]);

        // Второй вызов ничего не генерирует
        assert_eq!(chat.ensure_keys().unwrap(), public);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_send_includes_self_and_receive() {
        let keys = fixture();
        let mut alice = Chat::new("42", storage_with_alice("42"));
        alice.ensure_keys().unwrap();

        let recipients = BTreeMap::from([("43".to_string(), keys.bob_public_pem.clone())]);
        let outgoing = alice.send("conv-9", "Your CAS letter is issued", &recipients).unwrap();
        assert!(outgoing.encrypted_keys.contains_key("42"));
        assert!(outgoing.encrypted_keys.contains_key("43"));

        // Отправитель читает своё сообщение
        let own = alice.receive(&to_incoming(&outgoing, "42")).unwrap();
        assert_eq!(own.content, "Your CAS letter is issued");
    }

    #[test]
    fn test_receive_requires_unlocked_key() {
        let chat = Chat::new("42", storage_with_alice("42"));
        let outgoing = OutgoingChatMessage {
            conversation_id: "c".into(),
            client_message_id: "l".into(),
            encrypted_content: "AAAA".into(),
            encrypted_keys: BTreeMap::new(),
        };
        let result = chat.receive(&to_incoming(&outgoing, "1"));
        assert!(matches!(result, Err(ChatError::KeysLocked)));
    }

    #[test]
    fn test_receive_failure_notifies() {
        let mut chat = Chat::new("42", storage_with_alice("42"));
        chat.ensure_keys().unwrap();
        let events = recorder(&mut chat);

        let outgoing = OutgoingChatMessage {
            conversation_id: "c".into(),
            client_message_id: "l".into(),
            encrypted_content: "AAAA".into(),
            encrypted_keys: BTreeMap::from([("42".to_string(), "AAAA".to_string())]),
        };
        let result = chat.receive(&to_incoming(&outgoing, "1"));

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().user_message(), "unable to decrypt this message");
        assert_eq!(
            events.borrow().as_slice(),
            &[ChatEvent::DecryptionFailed { message_id: "srv-1".into() }]
        );
    }

    #[test]
    fn test_send_with_bad_recipient_notifies_error() {
        let mut chat = Chat::new("42", storage_with_alice("42"));
        chat.ensure_keys().unwrap();
        let events = recorder(&mut chat);

        let recipients = BTreeMap::from([("13".to_string(), "broken".to_string())]);
        assert!(chat.send("c", "hi", &recipients).is_err());
        assert_eq!(
            events.borrow().as_slice(),
            &[ChatEvent::Error { message: "failed to encrypt message".into() }]
        );
    }

    #[test]
    fn test_sealed_keys_lock_and_unlock() {
        let keys = fixture();
        let sealed = master_key::seal_private_key(&keys.alice_private_pem, "password123").unwrap();
        let mut storage = MemoryStorage::new();
        storage
            .save_key_pair(StoredKeyPair {
                user_id: "42".into(),
                public_key: keys.alice_public_pem.clone(),
                private_key: PrivateKeyRecord::Sealed(sealed),
                created_at: 0,
            })
            .unwrap();

        let mut chat = Chat::new("42", storage);
        assert!(matches!(chat.ensure_keys(), Err(ChatError::KeysLocked)));
        assert_eq!(chat.public_key(), Some(keys.alice_public_pem.as_str()));
        assert!(chat.unlock("wrong-password1").is_err());

        chat.unlock("password123").unwrap();
        assert!(chat.has_keys());

        chat.lock();
        assert!(!chat.has_keys());
    }

    #[test]
    fn test_unlock_damaged_sealed_record() {
        let keys = fixture();
        let mut sealed = master_key::seal_private_key(&keys.alice_private_pem, "password123").unwrap();
        sealed.ciphertext = "AAAA".into();

        let mut storage = MemoryStorage::new();
        storage
            .save_key_pair(StoredKeyPair {
                user_id: "42".into(),
                public_key: keys.alice_public_pem.clone(),
                private_key: PrivateKeyRecord::Sealed(sealed),
                created_at: 0,
            })
            .unwrap();

        let mut chat = Chat::new("42", storage);
        let result = chat.unlock("password123");
        assert!(matches!(
            result,
            Err(ChatError::Crypto(CryptoError::KeySealingFailed(_)))
        ));
        assert!(!chat.has_keys());
    }

    #[test]
    fn test_reset_keys() {
        let mut chat = Chat::new("42", storage_with_alice("42"));
        chat.ensure_keys().unwrap();
        let events = recorder(&mut chat);

        chat.reset_keys().unwrap();
        assert!(!chat.has_keys());
        assert!(chat.storage().is_empty());
        assert_eq!(events.borrow().as_slice(), &[ChatEvent::KeysCleared]);
    }

    #[test]
    fn test_event_json_shape() {
        let opened = serde_json::to_value(ChatEvent::MessageOpened { message_id: "7".into() }).unwrap();
        assert_eq!(opened, serde_json::json!({ "type": "message_opened", "message_id": "7" }));

        let cleared = serde_json::to_value(ChatEvent::KeysCleared).unwrap();
        assert_eq!(cleared, serde_json::json!({ "type": "keys_cleared" }));
    }

    #[test]
    fn test_unsubscribe() {
        let mut chat = Chat::new("42", storage_with_alice("42"));
        let events = Rc::new(RefCell::new(0));
        let counter = events.clone();
        let id = chat.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(chat.unsubscribe(id));
        assert!(!chat.unsubscribe(id));

        chat.ensure_keys().unwrap();
        assert_eq!(*events.borrow(), 0);
    }
}
