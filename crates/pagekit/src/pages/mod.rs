//! Page objects for the sites under test.

pub mod bupa;

pub use bupa::{BupaPage, Menu, MenuItem};
