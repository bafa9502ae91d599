//! Pay period and earnings engine for a flight instructor's pay log.
//!
//! This crate lays out fixed 14-day pay periods from an anchor Monday,
//! keeps exactly one persisted period current, resolves effective-dated pay
//! rates, and aggregates logged hours into earnings totals.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod registrar;
pub mod store;
