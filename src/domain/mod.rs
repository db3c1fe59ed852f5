pub mod rates;
pub mod subscription;

pub use rates::*;
pub use subscription::*;
