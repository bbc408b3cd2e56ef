pub mod categories;
pub mod orders;
pub mod products;
pub mod stores;
pub mod users;
