pub mod auth;
pub mod backup;
pub mod crm;
pub mod dashboard;
pub mod finance;
pub mod inventory;
pub mod operations;
pub mod seed;
