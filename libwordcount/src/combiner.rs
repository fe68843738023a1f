use emitter::EmitFinal;
use errors::*;
use intermediate::IntermediateInputKV;

/// The `Combine` trait defines a function for performing a combine operation.
///
/// A combine runs over the values a single map task produced for one key, before any values
/// from other map tasks are merged in. Running it must never change the final result, so an
/// implementation has to be associative and commutative over its input values.
///
/// # Arguments
///
/// * `input`   - A `IntermediateInputKV` containing the input data for the combine operation.
/// * `emitter` - A struct implementing the `EmitFinal` trait,
///               provided by the combine runner.
///
/// # Outputs
///
/// An empty result used for returning an error. Outputs of the combine operation are sent out
/// through the `emitter`.
pub trait Combine<K, V> {
    fn combine<E>(&self, input: IntermediateInputKV<K, V>, emitter: E) -> Result<()>
    where
        E: EmitFinal<V>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use emitter::FinalVecEmitter;

    struct MaxCombiner;
    impl Combine<String, u64> for MaxCombiner {
        fn combine<E>(&self, input: IntermediateInputKV<String, u64>, mut emitter: E) -> Result<()>
        where
            E: EmitFinal<u64>,
        {
            let max = input.values.into_iter().max().unwrap_or_default();
            emitter.emit(max)?;
            Ok(())
        }
    }

    #[test]
    fn test_combiner_test_interface() {
        let test_kv = IntermediateInputKV::new("key".to_owned(), vec![3, 9, 4]);
        let mut sink: Vec<u64> = Vec::new();

        MaxCombiner
            .combine(test_kv, FinalVecEmitter::new(&mut sink))
            .unwrap();

        assert_eq!(vec![9], sink);
    }
}
