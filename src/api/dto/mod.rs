pub mod customers;
pub mod files;
pub mod me;
