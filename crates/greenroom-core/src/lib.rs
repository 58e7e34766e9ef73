//! Greenroom Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Booking`, `Resource`, `ConflictLog`
//! - **Value objects** - `TimeSlot`, typed identifiers, `ConflictData`
//! - **Port definitions** - `IBookingRepository` for persistence adapters
//! - **Configuration** - YAML-backed settings for host processes
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no storage
//! dependencies. Ports define trait interfaces that adapter crates
//! implement. The conflict-detection component in `greenroom-conflict`
//! orchestrates domain entities through the port interfaces.

pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
