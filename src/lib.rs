// src/lib.rs

//! Roomwatch: student-accommodation room price tracker

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
