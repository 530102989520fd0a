//! Headless client for a real-estate listing backend: property list with
//! filters and pagination, a four-step property form, inquiries and viewing
//! schedules.

pub mod api;
pub mod config;
pub mod filter;
pub mod inquiry;
pub mod listing;
pub mod model;
pub mod pagination;
pub mod validation;
pub mod wizard;
