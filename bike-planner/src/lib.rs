//! Bike-share route planner server.
//!
//! A web service that answers: "what is the fastest way from here to
//! there if I walk to a bike, ride it to a free dock, and walk the rest?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod geodesic;
pub mod planner;
pub mod routing;
pub mod stations;
pub mod web;
