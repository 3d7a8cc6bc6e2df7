use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Deserialize with the JSON path of the failing node in the error.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| Error::Catalog {
        path: err.path().to_string(),
        source: err.into_inner(),
    })
}
