//! Domain layer - core business logic and entities

pub mod history;
pub mod portfolio;
pub mod price;
pub mod tracking;
