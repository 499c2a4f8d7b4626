//! Automated camera director for live race broadcasts.
//!
//! A [`session::Session`] consumes the telemetry updates of one broadcast
//! connection and feeds them to a [`director::Director`], which keeps the car
//! table and front gaps current and, when armed, picks the car the broadcast
//! feed should follow.

#[macro_use] extern crate log;

pub mod broadcast;
pub mod car;
pub mod clock;
pub mod config;
pub mod director;
pub mod error;
pub mod gap;
pub mod session;
pub mod sink;
pub mod track;
pub mod weight;
