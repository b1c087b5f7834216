//! Service Layer
//!
//! Business logic between the route handlers and the store. Services take a
//! `&dyn WarehouseStore` and return domain errors; handlers turn those into
//! HTTP responses.

mod allocation_service;
mod credential_service;
mod ingestion_service;
mod occupancy_service;

pub use allocation_service::*;
pub use credential_service::*;
pub use ingestion_service::*;
pub use occupancy_service::*;
