use errors::*;
use multimap::MultiMap;
use std::cmp::Eq;
use std::hash::Hash;

/// The `EmitIntermediate` trait specifies structs which can send key-value pairs to an in-memory
/// data structure.
///
/// Emitted pairs are owned values; an emitter never hands out a buffer to be reused by the
/// caller.
pub trait EmitIntermediate<K, V> {
    /// Takes ownership of a key-value pair and moves it somewhere else.
    ///
    /// Returns an empty `Result` used for error handling.
    fn emit(&mut self, key: K, value: V) -> Result<()>;
}

/// The `EmitFinal` trait specifies structs which can send values to an in-memory data structure.
///
/// It is used by `Combine` and `Reduce`, where the key is fixed by the input.
pub trait EmitFinal<V> {
    /// Takes ownership of a value and moves it somewhere else.
    fn emit(&mut self, value: V) -> Result<()>;
}

/// A struct implementing `EmitIntermediate` which emits to a `std::vec::Vec`.
pub struct IntermediateVecEmitter<'a, K: 'a, V: 'a> {
    sink: &'a mut Vec<(K, V)>,
}

impl<'a, K, V> IntermediateVecEmitter<'a, K, V> {
    /// Constructs a new `IntermediateVecEmitter` with a mutable reference to a given `Vec`.
    ///
    /// # Arguments
    ///
    /// * `sink` - A mutable reference to the `Vec` to receive the emitted values.
    pub fn new(sink: &'a mut Vec<(K, V)>) -> Self {
        IntermediateVecEmitter { sink }
    }
}

impl<'a, K, V> EmitIntermediate<K, V> for IntermediateVecEmitter<'a, K, V> {
    fn emit(&mut self, key: K, value: V) -> Result<()> {
        self.sink.push((key, value));
        Ok(())
    }
}

/// A struct implementing `EmitIntermediate` which emits to a `multimap::MultiMap`, grouping
/// values by key as they arrive.
pub struct MultiMapEmitter<'a, K: 'a, V: 'a>
where
    K: Eq + Hash,
{
    sink: &'a mut MultiMap<K, V>,
}

impl<'a, K, V> MultiMapEmitter<'a, K, V>
where
    K: Eq + Hash,
{
    /// Constructs a new `MultiMapEmitter` with a mutable reference to a given MultiMap.
    ///
    /// # Arguments
    ///
    /// * `sink` - A mutable reference to the `MultiMap` to receive the emitted values.
    pub fn new(sink: &'a mut MultiMap<K, V>) -> Self {
        MultiMapEmitter { sink }
    }
}

impl<'a, K, V> EmitIntermediate<K, V> for MultiMapEmitter<'a, K, V>
where
    K: Eq + Hash,
{
    fn emit(&mut self, key: K, value: V) -> Result<()> {
        self.sink.insert(key, value);
        Ok(())
    }
}

/// A struct implementing `EmitFinal` which emits to a `std::vec::Vec`.
pub struct FinalVecEmitter<'a, V: 'a> {
    sink: &'a mut Vec<V>,
}

impl<'a, V> FinalVecEmitter<'a, V> {
    pub fn new(sink: &'a mut Vec<V>) -> Self {
        FinalVecEmitter { sink }
    }
}

impl<'a, V> EmitFinal<V> for FinalVecEmitter<'a, V> {
    fn emit(&mut self, value: V) -> Result<()> {
        self.sink.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intermediate_vec_emitter_keeps_order() {
        let mut vec: Vec<(String, u64)> = Vec::new();

        {
            let mut emitter = IntermediateVecEmitter::new(&mut vec);
            emitter.emit("foo".to_owned(), 1).unwrap();
            emitter.emit("bar".to_owned(), 1).unwrap();
            emitter.emit("foo".to_owned(), 1).unwrap();
        }

        let expected = vec![
            ("foo".to_owned(), 1),
            ("bar".to_owned(), 1),
            ("foo".to_owned(), 1),
        ];
        assert_eq!(expected, vec);
    }

    #[test]
    fn multimap_emitter_with_duplicate_keys() {
        let mut map: MultiMap<u16, u16> = MultiMap::new();

        {
            let mut emitter: MultiMapEmitter<u16, u16> = MultiMapEmitter::new(&mut map);
            emitter.emit(0xDEAD, 0xBEEF).unwrap();
            emitter.emit(0xDEAD, 0xBABE).unwrap();
        }

        let mut pair = map.into_iter().next().unwrap();
        pair.1.sort();
        let expected_values = vec![0xBABE, 0xBEEF];
        assert_eq!(0xDEAD, pair.0);
        assert_eq!(expected_values.as_slice(), pair.1.as_slice());
    }

    #[test]
    fn final_vec_emitter_with_counts() {
        let mut vec: Vec<u64> = Vec::new();

        {
            let mut emitter = FinalVecEmitter::new(&mut vec);
            emitter.emit(3).unwrap();
        }

        assert_eq!(vec![3], vec);
    }
}
