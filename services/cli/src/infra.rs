use coaching_scoring::error::AppError;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, AppError> {
    Ok(BufReader::new(File::open(path)?))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    Ok(serde_json::from_reader(open(path)?)?)
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
