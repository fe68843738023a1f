use mapper::MapInputKV;

pub const MEGA_BYTE: u64 = 1000 * 1000;
/// Default target size of an input split.
pub const MAP_INPUT_SIZE: u64 = MEGA_BYTE * 64;

/// `InputSplit` is one processing unit of the input: a byte range of the input text that is
/// mapped and combined by a single map task. Splits always start and end on line boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct InputSplit {
    pub id: usize,
    pub start_byte: u64,
    pub end_byte: u64,
}

impl InputSplit {
    pub fn len(&self) -> u64 {
        self.end_byte - self.start_byte
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the records of this split: one per line, keyed by the byte offset of the line
    /// within the whole input.
    pub fn records<'a>(&self, text: &'a str) -> Records<'a> {
        Records {
            text,
            offset: self.start_byte as usize,
            end: self.end_byte as usize,
        }
    }
}

/// Iterator over the line records of an `InputSplit`.
pub struct Records<'a> {
    text: &'a str,
    offset: usize,
    end: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = MapInputKV;

    fn next(&mut self) -> Option<MapInputKV> {
        if self.offset >= self.end {
            return None;
        }

        let remaining = &self.text[self.offset..self.end];
        let (line, consumed) = match remaining.find('\n') {
            Some(newline) => (&remaining[..newline], newline + 1),
            None => (remaining, remaining.len()),
        };
        let line = line.trim_end_matches('\r');

        let record = MapInputKV::new(self.offset as u64, line);
        self.offset += consumed;
        Some(record)
    }
}

/// `create_input_splits` divides `text` into splits of roughly `split_size` bytes.
///
/// A split is closed at the first line end after it reaches `split_size` bytes, so a single long
/// line is never divided. Empty text produces no splits.
pub fn create_input_splits(text: &str, split_size: u64) -> Vec<InputSplit> {
    let mut splits = Vec::new();
    let total = text.len();

    let mut start = 0;
    let mut cursor = 0;
    while cursor < total {
        cursor = match text[cursor..].find('\n') {
            Some(newline) => cursor + newline + 1,
            None => total,
        };

        if (cursor - start) as u64 >= split_size {
            splits.push(InputSplit {
                id: splits.len(),
                start_byte: start as u64,
                end_byte: cursor as u64,
            });
            start = cursor;
        }
    }

    if start < total {
        splits.push(InputSplit {
            id: splits.len(),
            start_byte: start as u64,
            end_byte: total as u64,
        });
    }

    splits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_texts<'a>(text: &'a str, splits: &[InputSplit]) -> Vec<&'a str> {
        splits
            .iter()
            .map(|split| &text[split.start_byte as usize..split.end_byte as usize])
            .collect()
    }

    #[test]
    fn empty_text_has_no_splits() {
        assert!(create_input_splits("", MAP_INPUT_SIZE).is_empty());
    }

    #[test]
    fn small_text_is_one_split() {
        let splits = create_input_splits("dog dog\ndog\n", MAP_INPUT_SIZE);

        assert_eq!(
            vec![InputSplit { id: 0, start_byte: 0, end_byte: 12 }],
            splits
        );
    }

    #[test]
    fn splits_are_cut_at_line_boundaries() {
        let text = "dog dog\ndog\ncat\n";

        let splits = create_input_splits(text, 4);

        assert_eq!(vec!["dog dog\n", "dog\n", "cat\n"], split_texts(text, &splits));
        assert_eq!(vec![0, 1, 2], splits.iter().map(|s| s.id).collect::<Vec<_>>());
    }

    #[test]
    fn splits_cover_text_without_trailing_newline() {
        let text = "a b\nc";

        let splits = create_input_splits(text, 1);

        assert_eq!(vec!["a b\n", "c"], split_texts(text, &splits));
    }

    #[test]
    fn records_are_keyed_by_byte_offset() {
        let text = "the cat\r\nsat\n\non the mat";
        let splits = create_input_splits(text, MAP_INPUT_SIZE);

        let records: Vec<MapInputKV> = splits[0].records(text).collect();

        assert_eq!(
            vec![
                MapInputKV::new(0, "the cat"),
                MapInputKV::new(9, "sat"),
                MapInputKV::new(13, ""),
                MapInputKV::new(14, "on the mat"),
            ],
            records
        );
    }

    #[test]
    fn records_of_later_split() {
        let text = "dog dog\ndog\n";
        let splits = create_input_splits(text, 8);

        let records: Vec<MapInputKV> = splits[1].records(text).collect();

        assert_eq!(vec![MapInputKV::new(8, "dog")], records);
    }
}
