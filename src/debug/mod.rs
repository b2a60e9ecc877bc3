// src/debug/mod.rs

//! The package of helpers for printing messages to the user.

pub mod printers;
