//! Delivery route lookup and estimated delivery date dashboard.

pub mod api;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod input;
pub mod models;
pub mod presenter;
pub mod render;
pub mod route_client;
pub mod session;
pub mod warehouse;
pub mod weights;
