//! Infrastructure layer - external collaborators

pub mod price_api;
pub mod storage;
