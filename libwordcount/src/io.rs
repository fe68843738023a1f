use std::path::Path;

use util::data_layer::AbstractionLayer;

use errors::*;

/// `read_input_text` reads the job input through the data layer and returns it as text.
///
/// Returns an `InvalidInput` error if the input does not exist, is not a file, cannot be read or
/// is not valid UTF-8.
pub fn read_input_text(data_layer: &dyn AbstractionLayer, path: &Path) -> Result<String> {
    let display_path = path.to_string_lossy().into_owned();

    if !data_layer.exists(path)? {
        return Err(ErrorKind::InvalidInput(format!("{} does not exist", display_path)).into());
    }
    if !data_layer.is_file(path)? {
        return Err(ErrorKind::InvalidInput(format!("{} is not a file", display_path)).into());
    }

    let bytes = data_layer
        .read_file(path)
        .chain_err(|| ErrorKind::InvalidInput(format!("{} is not readable", display_path)))?;
    if bytes.is_empty() {
        warn!("Input {} is empty", display_path);
    }

    String::from_utf8(bytes)
        .chain_err(|| ErrorKind::InvalidInput(format!("{} is not UTF-8 text", display_path)))
}
