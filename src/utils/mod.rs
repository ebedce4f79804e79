pub mod branch_name_cache;
pub mod holiday_cache;
pub mod holiday_client;
