pub mod category;
pub mod health;
pub mod menu;
pub mod user;
