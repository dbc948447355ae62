// Domain layer: entity models and the record port. No I/O here.

pub mod model;
pub mod ports;
