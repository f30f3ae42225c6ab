//! Listings site core: accounts, listing search, and inquiry intake.
//!
//! Each feature module follows the same split: `domain` types, a `repository`
//! trait boundary, a `service` holding the request logic, and a `router`
//! exposing it over HTTP.

pub mod accounts;
pub mod config;
pub mod contacts;
pub mod error;
pub mod listings;
pub mod pagination;
pub mod storage;
pub mod telemetry;
pub mod web;
