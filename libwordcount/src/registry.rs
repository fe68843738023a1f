use combiner::Combine;
use emitter::EmitFinal;
use errors::*;
use intermediate::IntermediateInputKV;
use mapper::Map;
use partition::{HashPartitioner, Partition};
use reducer::Reduce;
use wordcount::{IntSumReducer, TokenizerMapper};

/// `UserImplRegistry` holds the stages a job is made of.
///
/// The runner calls `mapper` on every record, `combiner` (if any) on the grouped map output of
/// each input split, `partitioner` on every pair leaving a map task, and `reducer` on every key
/// of a reduce partition.
pub struct UserImplRegistry<'a, M, R, P, C>
where
    M: Map + 'a,
    R: Reduce<M::Key, M::Value> + 'a,
    P: Partition<M::Key, M::Value> + 'a,
    C: Combine<M::Key, M::Value> + 'a,
{
    pub mapper: &'a M,
    pub reducer: &'a R,
    pub partitioner: &'a P,
    pub combiner: Option<&'a C>,
}

impl<'a, M, R, P, C> UserImplRegistry<'a, M, R, P, C>
where
    M: Map + 'a,
    R: Reduce<M::Key, M::Value> + 'a,
    P: Partition<M::Key, M::Value> + 'a,
    C: Combine<M::Key, M::Value> + 'a,
{
    pub fn new(mapper: &'a M, reducer: &'a R, partitioner: &'a P, combiner: Option<&'a C>) -> Self {
        UserImplRegistry {
            mapper,
            reducer,
            partitioner,
            combiner,
        }
    }
}

/// The combiner type of a registry without a combine stage. It has no values.
pub enum NoCombiner {}

impl<K, V> Combine<K, V> for NoCombiner {
    fn combine<E>(&self, _input: IntermediateInputKV<K, V>, _emitter: E) -> Result<()>
    where
        E: EmitFinal<V>,
    {
        match *self {}
    }
}

impl<'a, M, R, P> UserImplRegistry<'a, M, R, P, NoCombiner>
where
    M: Map + 'a,
    R: Reduce<M::Key, M::Value> + 'a,
    P: Partition<M::Key, M::Value> + 'a,
{
    /// A registry whose map output is partitioned without being combined.
    pub fn without_combiner(mapper: &'a M, reducer: &'a R, partitioner: &'a P) -> Self {
        UserImplRegistry::new(mapper, reducer, partitioner, None)
    }
}

/// `WordCountStages` owns the stages of a word count: the tokenizer, the summer of counts, and a
/// hash partitioner routing each token to one of the reduce tasks.
///
/// One `IntSumReducer` does both sums: the counts of a token within an input split when
/// combining is enabled, and the counts of a token across all splits when reducing.
pub struct WordCountStages {
    tokenizer: TokenizerMapper,
    summer: IntSumReducer,
    partitioner: HashPartitioner,
    combine: bool,
}

impl WordCountStages {
    pub fn new(reduce_tasks: u64, combine: bool) -> Result<Self> {
        if reduce_tasks == 0 {
            return Err("A word count needs at least one reduce task".into());
        }

        Ok(WordCountStages {
            tokenizer: TokenizerMapper,
            summer: IntSumReducer,
            partitioner: HashPartitioner::new(reduce_tasks),
            combine,
        })
    }

    pub fn registry<'a>(
        &'a self,
    ) -> UserImplRegistry<'a, TokenizerMapper, IntSumReducer, HashPartitioner, IntSumReducer> {
        let combiner = if self.combine {
            Some(&self.summer)
        } else {
            None
        };
        UserImplRegistry::new(&self.tokenizer, &self.summer, &self.partitioner, combiner)
    }
}
