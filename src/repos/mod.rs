pub mod customer_repo;
pub mod error;
