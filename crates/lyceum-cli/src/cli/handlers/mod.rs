//! Command handlers for the Lyceum CLI

pub mod auth;
pub mod config;
pub mod finance;
pub mod people;
pub mod schedule;
