// Состояние клиента

pub mod chat;
