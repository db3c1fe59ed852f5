pub mod handlers;
pub mod updates;

pub use handlers::CommandHandlers;
pub use updates::UpdateListener;
