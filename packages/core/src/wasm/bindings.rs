// WASM bindings для веб-клиента

use crate::api::crypto;
use crate::error::CryptoError;
use crate::protocol::wire;
use crate::state::chat::SecureChat;
use crate::storage::local_storage::LocalKeyStorage;
use crate::utils::error::ChatError;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use wasm_bindgen::prelude::*;

type JsResult<T> = Result<T, JsValue>;

// Однопоточный WASM: thread_local + RefCell
thread_local! {
    static CHATS: RefCell<HashMap<String, SecureChat<LocalKeyStorage>>> = RefCell::new(HashMap::new());
}

fn crypto_error(error: CryptoError) -> JsValue {
    JsValue::from_str(error.user_message())
}

fn with_chat<F, T>(chat_id: &str, f: F) -> JsResult<T>
where
    F: FnOnce(&mut SecureChat<LocalKeyStorage>) -> Result<T, ChatError>,
{
    CHATS.with(|chats| {
        let mut chats = chats.borrow_mut();
        let chat = chats
            .get_mut(chat_id)
            .ok_or_else(|| ChatError::NotFound(format!("Secure chat {} not found", chat_id)))?;
        f(chat).map_err(Into::into)
    })
}

#[wasm_bindgen(js_name = initCrypto)]
pub fn init_crypto() {
    console_error_panic_hook::set_once();
}

// ============================================================================
// Операции без состояния
// ============================================================================

/// `{ publicKey, privateKey }`
#[wasm_bindgen(js_name = generateKeyPair)]
pub fn generate_key_pair() -> JsResult<JsValue> {
    let pair = crypto::generate_key_pair().map_err(crypto_error)?;
    Ok(serde_wasm_bindgen::to_value(&pair)?)
}

/// `recipient_public_keys`: объект `{ [userId]: publicKeyPem }`
#[wasm_bindgen(js_name = encryptMessage)]
pub fn encrypt_message(content: &str, recipient_public_keys: JsValue) -> JsResult<JsValue> {
    let recipients: BTreeMap<String, String> = serde_wasm_bindgen::from_value(recipient_public_keys)?;
    let envelope = crypto::encrypt_message(content, recipients).map_err(crypto_error)?;
    Ok(serde_wasm_bindgen::to_value(&envelope)?)
}

#[wasm_bindgen(js_name = decryptMessage)]
pub fn decrypt_message(encrypted_content: &str, encrypted_key: &str, private_key: &str) -> JsResult<String> {
    crypto::decrypt_message(encrypted_content, encrypted_key, private_key).map_err(crypto_error)
}

#[wasm_bindgen(js_name = hasKeys)]
pub fn has_keys(public_key: Option<String>, private_key: Option<String>) -> bool {
    crypto::has_keys(public_key.as_deref(), private_key.as_deref())
}

// ============================================================================
// Состояние защищённого чата
// ============================================================================

#[wasm_bindgen(js_name = createSecureChat)]
pub fn create_secure_chat(user_id: String) -> JsResult<String> {
    let storage = LocalKeyStorage::open()?;
    let chat_id = uuid::Uuid::new_v4().to_string();
    CHATS.with(|chats| {
        chats.borrow_mut().insert(chat_id.clone(), SecureChat::new(user_id, storage));
    });
    Ok(chat_id)
}

#[wasm_bindgen(js_name = destroySecureChat)]
pub fn destroy_secure_chat(chat_id: String) {
    CHATS.with(|chats| {
        chats.borrow_mut().remove(&chat_id);
    });
}

/// Возвращает публичный ключ для публикации на сервере
#[wasm_bindgen(js_name = secureChatEnsureKeys)]
pub fn secure_chat_ensure_keys(chat_id: String, password: Option<String>) -> JsResult<String> {
    with_chat(&chat_id, |chat| match password {
        Some(password) => chat.ensure_keys_with_password(&password),
        None => chat.ensure_keys(),
    })
}

#[wasm_bindgen(js_name = secureChatHasKeys)]
pub fn secure_chat_has_keys(chat_id: String) -> bool {
    with_chat(&chat_id, |chat| Ok(chat.has_keys())).unwrap_or(false)
}

/// Возвращает JSON исходящего сообщения для отправки на сервер
#[wasm_bindgen(js_name = secureChatSend)]
pub fn secure_chat_send(
    chat_id: String,
    conversation_id: String,
    content: String,
    recipient_public_keys: JsValue,
) -> JsResult<String> {
    let recipients: BTreeMap<String, String> = serde_wasm_bindgen::from_value(recipient_public_keys)?;
    with_chat(&chat_id, |chat| {
        let outgoing = chat.send(&conversation_id, &content, &recipients)?;
        wire::pack_outgoing(&outgoing)
    })
}

/// `message_json`: сообщение в формате сервера
#[wasm_bindgen(js_name = secureChatReceive)]
pub fn secure_chat_receive(chat_id: String, message_json: String) -> JsResult<JsValue> {
    let message = wire::unpack_incoming(&message_json)?;
    let decrypted = with_chat(&chat_id, |chat| chat.receive(&message))?;
    Ok(serde_wasm_bindgen::to_value(&decrypted)?)
}

/// `callback(event)` вызывается синхронно на каждое `ChatEvent`.
/// Возвращает id подписки для `secureChatUnsubscribe`.
/// Внутри callback нельзя синхронно вызывать `secureChat*`: чат в этот момент занят.
#[wasm_bindgen(js_name = secureChatSubscribe)]
pub fn secure_chat_subscribe(chat_id: String, callback: js_sys::Function) -> JsResult<f64> {
    with_chat(&chat_id, |chat| {
        let id = chat.subscribe(move |event| {
            use tracing::warn;

            let delivered = serde_wasm_bindgen::to_value(event)
                .map_err(JsValue::from)
                .and_then(|value| callback.call1(&JsValue::NULL, &value));
            if delivered.is_err() {
                warn!("Chat event listener failed");
            }
        });
        // В JS id приходит числом
        Ok(id as f64)
    })
}

#[wasm_bindgen(js_name = secureChatUnsubscribe)]
pub fn secure_chat_unsubscribe(chat_id: String, subscription_id: f64) -> bool {
    with_chat(&chat_id, |chat| Ok(chat.unsubscribe(subscription_id as u64))).unwrap_or(false)
}

#[wasm_bindgen(js_name = secureChatReset)]
pub fn secure_chat_reset(chat_id: String) -> JsResult<()> {
    with_chat(&chat_id, |chat| chat.reset_keys())
}
