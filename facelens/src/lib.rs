//! Stateless HTTP service comparing faces across two uploaded images and
//! extracting text from one in reading order.

pub mod api;
pub mod config;
pub mod error;
pub mod faces;
pub mod ocr;
pub mod staging;
