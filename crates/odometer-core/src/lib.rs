#![cfg_attr(not(test), no_std)]

//! Platform-independent logic for the gear odometer display.
//!
//! Everything here runs on the host in tests: hardware is reached only
//! through [`render::FrameSink`], [`store::DistanceStore`] and an injected
//! `embedded_hal_async::delay::DelayNs`.

pub mod animation;
pub mod app;
pub mod control;
pub mod font;
pub mod format;
pub mod link;
pub mod render;
pub mod store;
pub mod strava;
