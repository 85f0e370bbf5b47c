//! Question round accounting.

pub mod tracker;
