mod abstraction_layer;
mod local_layer;

pub use self::abstraction_layer::AbstractionLayer;
pub use self::local_layer::LocalAbstractionLayer;
