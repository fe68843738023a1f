use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use util::data_layer::AbstractionLayer;

use errors::*;
use wordcount::{Count, Token};

/// Separator between the key and the value of an output record.
pub const KEY_VALUE_SEPARATOR: char = '\t';
/// Prefix of the file name of every output part.
pub const OUTPUT_PART_PREFIX: &str = "part-r-";

/// Returns the file name of the output part written by the reduce task for `partition`.
pub fn output_part_name(partition: u64) -> String {
    format!("{}{:05}", OUTPUT_PART_PREFIX, partition)
}

/// `serialise_records` renders final key-value pairs as newline-delimited
/// `<key>\t<value>` records.
pub fn serialise_records<K: Display, V: Display>(pairs: &[(K, V)]) -> String {
    let mut output = String::new();
    for &(ref key, ref value) in pairs {
        output.push_str(&format!("{}{}{}\n", key, KEY_VALUE_SEPARATOR, value));
    }
    output
}

/// Parses a single `<token>\t<count>` record.
pub fn parse_record(line: &str) -> Result<(Token, Count)> {
    let separator = line
        .rfind(KEY_VALUE_SEPARATOR)
        .chain_err(|| format!("Record {:?} has no separator", line))?;
    let count: Count = line[separator + 1..]
        .parse()
        .chain_err(|| format!("Record {:?} has an invalid count", line))?;

    Ok((line[..separator].to_owned(), count))
}

/// `read_output` reads every output part of a committed job output directory and sums the
/// records by token.
pub fn read_output(data_layer: &dyn AbstractionLayer, output_dir: &Path) -> Result<BTreeMap<Token, Count>> {
    let mut totals: BTreeMap<Token, Count> = BTreeMap::new();

    for path in data_layer.read_dir(output_dir)? {
        let is_part = path.file_name()
            .map(|name| name.to_string_lossy().starts_with(OUTPUT_PART_PREFIX))
            .unwrap_or(false);
        if !is_part {
            continue;
        }

        let bytes = data_layer.read_file(&path)?;
        let content = String::from_utf8(bytes)
            .chain_err(|| format!("Output part {:?} is not UTF-8", path))?;
        for line in content.lines() {
            let (token, count) = parse_record(line)?;
            let total = totals.entry(token).or_insert(0);
            *total = total
                .checked_add(count)
                .chain_err(|| format!("Count of record {:?} in {:?} overflows", line, path))?;
        }
    }

    Ok(totals)
}
