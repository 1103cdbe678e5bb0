pub mod prelude;

pub mod file;
pub mod song;
