pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Input document from `--input`, else from piped stdin, else None so the
/// caller falls back to individual flags.
pub fn document<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_input(path).map(Some),
        None => stdin::read_stdin(),
    }
}
