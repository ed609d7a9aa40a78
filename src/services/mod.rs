//! Modem features built on top of the command engine. Each module adds its
//! operations to [`Client`](crate::Client).

pub mod location;
pub mod sms;
pub mod tts;
