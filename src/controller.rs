/// Dashboard endpoints
pub mod dashboards;

mod params;

pub use params::Params;
