// Wire format (JSON)
// Используется для передачи сообщений через REST и WebSocket

use crate::protocol::messages::{IncomingChatMessage, OutgoingChatMessage};
use crate::utils::error::{ChatError, Result};

/// Упаковать исходящее сообщение (клиент -> сервер)
pub fn pack_outgoing(message: &OutgoingChatMessage) -> Result<String> {
    serde_json::to_string(message)
        .map_err(|e| ChatError::SerializationError(format!("JSON pack error: {}", e)))
}

/// Распаковать входящее сообщение (сервер -> клиент)
pub fn unpack_incoming(data: &str) -> Result<IncomingChatMessage> {
    serde_json::from_str(data)
        .map_err(|e| ChatError::SerializationError(format!("JSON unpack error: {}", e)))
}

/// Распаковать страницу истории сообщений
pub fn unpack_incoming_batch(data: &str) -> Result<Vec<IncomingChatMessage>> {
    serde_json::from_str(data)
        .map_err(|e| ChatError::SerializationError(format!("JSON unpack error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_pack_outgoing() {
        let msg = OutgoingChatMessage {
            conversation_id: "c9".to_string(),
            client_message_id: "local".to_string(),
            encrypted_content: "Y3Q=".to_string(),
            encrypted_keys: BTreeMap::from([("42".to_string(), "a2V5".to_string())]),
        };
        let packed = pack_outgoing(&msg).unwrap();
        assert!(packed.contains(r#""encrypted_keys":{"42":"a2V5"}"#));
        assert!(packed.contains(r#""encrypted_content":"Y3Q=""#));
    }

    #[test]
    fn test_unpack_incoming_with_direct_key() {
        let json = r#"{
            "id": "101",
            "conversation_id": "7",
            "sender_id": "3",
            "encrypted_content": "Y3Q=",
            "encrypted_key": "a2V5",
            "created_at": "2024-05-01T10:00:00Z"
        }"#;
        let msg = unpack_incoming(json).unwrap();
        assert_eq!(msg.encrypted_key.as_deref(), Some("a2V5"));
        assert!(msg.encrypted_keys.is_empty());
        assert_eq!(msg.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_unpack_batch() {
        let json = r#"[
            {"id": "1", "conversation_id": "7", "sender_id": "3", "encrypted_content": "YQ==", "encrypted_keys": {"9": "aw=="}},
            {"id": "2", "conversation_id": "7", "sender_id": "9", "encrypted_content": "Yg==", "encrypted_keys": {"3": "aw=="}}
        ]"#;
        let batch = unpack_incoming_batch(json).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].key_for("9"), Some("aw=="));
    }

    #[test]
    fn test_unpack_rejects_missing_fields() {
        let result = unpack_incoming(r#"{"id": "1"}"#);
        assert!(matches!(result, Err(ChatError::SerializationError(_))));
    }
}
