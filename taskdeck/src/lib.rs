//! Taskdeck: sync engine and view projections for a personal
//! task/calendar dashboard.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod gateway;
pub mod notify;
pub mod session;
pub mod store;
pub mod theme;
pub mod view;
