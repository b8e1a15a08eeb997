use std::error::Error;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes records into CSV bytes, headers included.
/// # Error
/// Errors if a record cannot be represented as a flat row
pub fn serialize(items: impl Iterator<Item = impl Serialize>) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for item in items {
        wtr.serialize(item)?;
    }
    Ok(wtr.into_inner()?)
}

/// Deserializes CSV bytes into records.
/// # Error
/// Errors if a row does not match the target type
pub fn deserialize<D: DeserializeOwned>(data: &[u8]) -> Result<Vec<D>, csv::Error> {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .from_reader(std::io::Cursor::new(data));
    rdr.into_deserialize().collect()
}
