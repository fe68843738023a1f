use emitter::EmitIntermediate;
use errors::*;

/// The `MapInputKV` is a struct for passing input data to a `Map`.
///
/// `key` is the byte offset of the record within the input, `value` is the record text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapInputKV {
    pub key: u64,
    pub value: String,
}

impl MapInputKV {
    pub fn new<S: Into<String>>(key: u64, value: S) -> Self {
        MapInputKV {
            key,
            value: value.into(),
        }
    }
}

/// The `Map` trait defines a function for performing a map operation.
///
/// The output types are decided by the implementation of this trait.
///
/// # Arguments
///
/// * `input` - A `MapInputKV` containing the input data for the map operation.
/// * `emitter` - A struct implementing the `EmitIntermediate` trait, provided by the map runner.
///
/// # Outputs
///
/// An empty result used for returning an error. Outputs of the map operation are sent out through
/// the `emitter`.
pub trait Map {
    type Key;
    type Value;
    fn map<E>(&self, input: MapInputKV, emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>;
}
