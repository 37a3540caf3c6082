pub mod customers;
pub mod fallback;
pub mod files;
pub mod health;
pub mod me;
