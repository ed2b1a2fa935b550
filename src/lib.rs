pub mod constants;
pub mod ephemeris;
pub mod precastro_errors;
pub mod sky;
pub mod time;
