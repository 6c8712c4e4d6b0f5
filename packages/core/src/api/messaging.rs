// API для отправки и получения зашифрованных сообщений

use crate::crypto::envelope;
use crate::crypto::CryptoProvider;
use crate::error::CryptoError;
use crate::protocol::messages::{DecryptedChatMessage, IncomingChatMessage, OutgoingChatMessage};
use crate::utils::error::{ChatError, Result};

/// Зашифровать сообщение перед отправкой на сервер.
///
/// В отличие от `envelope::encrypt_message`, пустой набор получателей здесь
/// ошибка: такое сообщение никто не сможет прочитать.
pub fn seal_outgoing<P, I, K, V>(
    conversation_id: &str,
    content: &str,
    recipient_public_keys: I,
) -> Result<OutgoingChatMessage>
where
    P: CryptoProvider,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    let mut recipients = recipient_public_keys.into_iter().peekable();
    if recipients.peek().is_none() {
        return Err(ChatError::InvalidInput(format!(
            "Conversation {} has no recipients with public keys",
            conversation_id
        )));
    }

    let sealed = envelope::encrypt_message::<P, _, _, _>(content, recipients)?;
    let client_message_id = uuid::Uuid::new_v4().to_string();

    Ok(OutgoingChatMessage::new(
        conversation_id.to_string(),
        client_message_id,
        sealed,
    ))
}

/// Расшифровать входящее сообщение для пользователя `user_id`.
///
/// Отсутствие ключа для пользователя неотличимо от любой другой ошибки
/// расшифровки.
pub fn open_incoming<P: CryptoProvider>(
    message: &IncomingChatMessage,
    user_id: &str,
    private_key_pem: &str,
) -> Result<DecryptedChatMessage> {
    let wrapped_key = message.key_for(user_id).ok_or(CryptoError::DecryptionFailed)?;
    let content = envelope::decrypt_message::<P>(&message.encrypted_content, wrapped_key, private_key_pem)?;

    Ok(DecryptedChatMessage {
        id: message.id.clone(),
        conversation_id: message.conversation_id.clone(),
        sender_id: message.sender_id.clone(),
        content,
        created_at: message.created_at.clone(),
    })
}

/// Расшифровать страницу истории. Сообщения, которые не удалось открыть,
/// возвращаются как ошибки на своих местах, остальные не страдают.
pub fn open_incoming_batch<P: CryptoProvider>(
    messages: &[IncomingChatMessage],
    user_id: &str,
    private_key_pem: &str,
) -> Vec<Result<DecryptedChatMessage>> {
    messages
        .iter()
        .map(|message| open_incoming::<P>(message, user_id, private_key_pem))
        .collect()
}
