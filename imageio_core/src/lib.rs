extern crate custom_error;
extern crate libloading;

pub mod models;
pub mod plugins;
pub mod utils;
