pub mod clients;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod users;
