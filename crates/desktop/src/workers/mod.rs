pub mod transfer_worker;
pub mod unavailable_service;
