pub mod send;

pub use send::{resolve_sender, MailBody, Recipients, SendRequest, SendResponse, ValidatedSend};
