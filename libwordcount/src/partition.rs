use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use errors::*;

/// The `PartitionInputKV` is a struct for passing input data to a `Partition`.
///
/// `PartitionInputKV` is a thin wrapper around a `(Key, Value)`,
/// used for creating a clearer API.
/// It can be constructed normally or using `PartitionInputKV::new()`.
#[derive(Debug, PartialEq)]
pub struct PartitionInputKV<'a, K: 'a, V: 'a> {
    pub key: &'a K,
    pub value: &'a V,
}

impl<'a, K, V> PartitionInputKV<'a, K, V> {
    pub fn new(key: &'a K, value: &'a V) -> Self {
        PartitionInputKV { key, value }
    }
}

/// The `Partition` trait defines a function for partitioning the results of a `Map` operation.
///
/// Every pair with the same key must land in the same partition, since each partition is
/// reduced independently.
///
/// # Arguments
///
/// * `input` - A `PartitionInputKV` containing an output pair of a map operation.
///
/// # Outputs
///
/// A Result<u64>, representing the output partition for the given key and value.
pub trait Partition<K, V> {
    fn partition(&self, input: PartitionInputKV<K, V>) -> Result<u64>;
}

/// `HashPartitioner` implements the `Partition` for any Key that can be hashed.
pub struct HashPartitioner {
    partition_count: u64,
}

impl HashPartitioner {
    pub fn new(partition_count: u64) -> Self {
        HashPartitioner { partition_count }
    }

    fn calculate_hash<T: Hash>(&self, t: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        t.hash(&mut hasher);
        hasher.finish()
    }
}

impl<K, V> Partition<K, V> for HashPartitioner
where
    K: Hash,
{
    fn partition(&self, input: PartitionInputKV<K, V>) -> Result<u64> {
        if self.partition_count == 0 {
            return Err("HashPartitioner requires at least one partition".into());
        }
        let hash: u64 = self.calculate_hash(input.key);
        Ok(hash % self.partition_count)
    }
}
