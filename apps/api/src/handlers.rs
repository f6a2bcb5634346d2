pub mod health;
pub mod resources;
pub mod stores;
