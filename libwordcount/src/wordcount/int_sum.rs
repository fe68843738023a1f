use combiner::Combine;
use emitter::EmitFinal;
use errors::*;
use intermediate::IntermediateInputKV;
use reducer::Reduce;
use super::{Count, Token};

/// Sums the counts attributed to `token`.
///
/// Fails with a `StageFailure` if there are no counts or the total overflows.
pub fn sum_counts(stage: &str, token: &str, counts: &[Count]) -> Result<Count> {
    if counts.is_empty() {
        return Err(ErrorKind::StageFailure(
            stage.to_owned(),
            format!("no counts for token {:?}", token),
        ).into());
    }

    let mut total: Count = 0;
    for count in counts {
        total = total.checked_add(*count).ok_or_else(|| {
            ErrorKind::StageFailure(
                stage.to_owned(),
                format!("count for token {:?} overflowed", token),
            )
        })?;
    }
    Ok(total)
}

/// `IntSumReducer` adds up the counts of a token. Sum is associative and commutative, so the same
/// type serves as the combiner and the reducer of the job.
pub struct IntSumReducer;

impl Combine<Token, Count> for IntSumReducer {
    fn combine<E>(&self, input: IntermediateInputKV<Token, Count>, mut emitter: E) -> Result<()>
    where
        E: EmitFinal<Count>,
    {
        let partial = sum_counts("combine", &input.key, &input.values)?;
        emitter
            .emit(partial)
            .chain_err(|| format!("Error emitting partial sum {:?}.", partial))?;
        Ok(())
    }
}

impl Reduce<Token, Count> for IntSumReducer {
    fn reduce<E>(&self, input: IntermediateInputKV<Token, Count>, mut emitter: E) -> Result<()>
    where
        E: EmitFinal<Count>,
    {
        let total = sum_counts("reduce", &input.key, &input.values)?;
        emitter
            .emit(total)
            .chain_err(|| format!("Error emitting value {:?}.", total))?;
        Ok(())
    }
}
