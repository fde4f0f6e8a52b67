pub mod auth;
pub mod backup_service;
pub mod crm_service;
pub mod dashboard_service;
pub mod finance_service;
pub mod inventory_service;
pub mod operation_service;
pub mod seed_service;
