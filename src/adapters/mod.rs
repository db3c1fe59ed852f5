pub mod cbr;
pub mod store;
pub mod telegram;

pub use cbr::CbrClient;
pub use store::SqliteStore;
pub use telegram::{CallbackQuery, Chat, Message, TelegramClient, Update, User};
