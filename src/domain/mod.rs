// Domain layer: settings model and the bucket ports implemented by adapters.

pub mod model;
pub mod ports;
