//! Pure helper functions shared by the board layers.

pub mod title;
