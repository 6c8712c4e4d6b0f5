// Протокол обмена сообщениями с бэкендом

pub mod messages;
pub mod wire;
