pub mod image;
pub mod io;
