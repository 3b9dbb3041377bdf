#![no_std]

//! ESP32-S3 board adapters for the gear odometer.

pub mod network;
pub mod platform;
pub mod storage;
