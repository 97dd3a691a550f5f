pub mod engine;
pub mod subscription;

pub use engine::Broadcaster;
pub use subscription::{SubscriberId, Subscription};
