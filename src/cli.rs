//! Command line interface.

pub mod build;
pub mod convert;
pub mod input;
pub mod inspect;
pub mod run;
pub mod spectrum;
pub mod utils;
