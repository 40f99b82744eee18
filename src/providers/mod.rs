// File: providers/mod.rs

pub mod tucao;
