pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed input from `--input <path>` or piped stdin, whichever is
/// present. Every subcommand goes through this one reader.
pub fn read_typed<T: DeserializeOwned>(
    path: Option<&str>,
    expects: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_input(path);
    }
    if let Some(value) = stdin::read_typed()? {
        return Ok(value);
    }
    Err(format!("--input <file.json|.yaml> or piped stdin required ({})", expects).into())
}
