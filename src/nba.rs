pub mod endpoints;
pub mod params;
