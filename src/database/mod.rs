pub mod models;
pub mod pool;
pub mod store;

pub use pool::DatabaseError;
