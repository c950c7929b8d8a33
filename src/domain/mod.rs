// Domain layer: data model and ports. The check components in `core` only see these types.

pub mod model;
pub mod ports;
