//! The word count job: a whitespace tokenizer for the map stage and an integer sum used for both
//! the combine and the reduce stage.

mod int_sum;
mod tokenizer;

pub use self::int_sum::{sum_counts, IntSumReducer};
pub use self::tokenizer::{tokenize, Tokens, TokenizerMapper};

/// A whitespace-delimited text fragment, the aggregation key. Compared by exact equality.
pub type Token = String;

/// The number of occurrences attributed to a token.
pub type Count = u64;
