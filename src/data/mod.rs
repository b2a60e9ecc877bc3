// src/data/mod.rs

//! The package of data structures used by the _readers_,
//! see [`crate::readers`].

pub mod datekey;
