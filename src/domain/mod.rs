// Domain layer: map data model, render descriptors and collaborator ports.

pub mod model;
pub mod ports;
pub mod view;
