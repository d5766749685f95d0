mod dialect;
mod params;

pub use dialect::load_dialect;
pub use params::build_parameters;
