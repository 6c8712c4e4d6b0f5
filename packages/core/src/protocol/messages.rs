// Сообщения чата, которыми клиент обменивается с бэкендом (REST / WebSocket)

use crate::crypto::envelope::EncryptionEnvelope;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Исходящее сообщение: конверт плюс адресация.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingChatMessage {
    pub conversation_id: String,
    /// Локальный id для сопоставления с ответом сервера
    pub client_message_id: String,
    pub encrypted_content: String,
    pub encrypted_keys: BTreeMap<String, String>,
}

impl OutgoingChatMessage {
    pub fn new(conversation_id: String, client_message_id: String, envelope: EncryptionEnvelope) -> Self {
        Self {
            conversation_id,
            client_message_id,
            encrypted_content: envelope.encrypted_content,
            encrypted_keys: envelope.encrypted_keys,
        }
    }
}

/// Входящее сообщение в том виде, в каком его отдаёт сервер.
///
/// Сервер может прислать либо ключ только для текущего пользователя
/// (`encrypted_key`), либо всю карту ключей.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingChatMessage {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub conversation_id: String,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub sender_id: String,
    pub encrypted_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub encrypted_keys: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl IncomingChatMessage {
    /// Обёрнутый AES-ключ для пользователя
    pub fn key_for(&self, user_id: &str) -> Option<&str> {
        self.encrypted_key
            .as_deref()
            .or_else(|| self.encrypted_keys.get(user_id).map(String::as_str))
    }
}

/// Идентификаторы бэкенда: целые числа, но приходят и строкой, и числом
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Integer(i64),
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match WireId::deserialize(deserializer)? {
        WireId::Text(text) => text,
        WireId::Integer(value) => value.to_string(),
    })
}

/// Расшифрованное сообщение для UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
