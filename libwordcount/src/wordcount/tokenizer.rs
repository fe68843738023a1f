use std::str::SplitWhitespace;

use emitter::EmitIntermediate;
use errors::*;
use mapper::{Map, MapInputKV};
use super::{Count, Token};

/// `Tokens` lazily yields one `(Token, 1)` pair per whitespace-delimited fragment of a text, in
/// the order the fragments appear.
pub struct Tokens<'a> {
    fragments: SplitWhitespace<'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (Token, Count);

    fn next(&mut self) -> Option<Self::Item> {
        self.fragments
            .next()
            .map(|fragment| (fragment.to_owned(), 1))
    }
}

/// Splits `text` on runs of Unicode whitespace. Empty fragments are never produced.
pub fn tokenize(text: &str) -> Tokens {
    Tokens {
        fragments: text.split_whitespace(),
    }
}

/// `TokenizerMapper` is the map stage of the word count: it emits `(token, 1)` for every token of
/// a record.
pub struct TokenizerMapper;

impl Map for TokenizerMapper {
    type Key = Token;
    type Value = Count;

    fn map<E>(&self, input: MapInputKV, mut emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>,
    {
        trace!("Tokenizing record at offset {}", input.key);

        for (token, count) in tokenize(&input.value) {
            emitter
                .emit(token, count)
                .chain_err(|| "Error emitting map key-value pair.")?;
        }
        Ok(())
    }
}
