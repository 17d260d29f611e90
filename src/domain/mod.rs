// Domain layer: value types, framework rules and ports (interfaces).

pub mod model;
pub mod ports;
pub mod rules;
