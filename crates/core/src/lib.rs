//! Core business logic for Clubdesk.
//!
//! This crate contains pure booking logic with ZERO web or database dependencies.
//! Every decision about a booking is made here; the db crate only loads
//! records and persists the resulting plans.
//!
//! # Modules
//!
//! - `calendar` - Club timezone, injectable clock, date normalization
//! - `facility` - Facility types, slots and per-facility policies
//! - `availability` - Conflict detection against maintenance, bookings, reservations and holds
//! - `pricing` - Rate × billable units
//! - `payment` - Payment reconciliation, voucher diffs and ledger deltas
//! - `booking` - The booking engine for create, update, cancel, holds and reservations

pub mod availability;
pub mod booking;
pub mod calendar;
pub mod facility;
pub mod payment;
pub mod pricing;
