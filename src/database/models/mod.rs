pub mod client;
pub mod order;
pub mod product;
pub mod promotion;
pub mod user;

pub use client::Client;
pub use order::{Order, OrderProduct, OrderPromotion};
pub use product::Product;
pub use promotion::Promotion;
pub use user::User;
