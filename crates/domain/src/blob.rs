//! The object store's blob record.

/// A versioned object in the object store. Keys follow
/// `"{stage}/{provider_lower}/{year}/{month}/{day}/{hour}/trips.json"`.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub key: String,
    pub body: Vec<u8>,
    pub version_id: Option<String>,
    pub encrypted: bool,
}

impl BlobObject {
    pub fn new(key: impl Into<String>, body: Vec<u8>, encrypted: bool) -> Self {
        Self { key: key.into(), body, version_id: None, encrypted }
    }
}

/// Builds the canonical object key prefix for a stage/provider/hour.
pub fn data_path(stage: &str, provider_lower: &str, year: i32, month: u32, day: u32, hour: u32) -> String {
    format!("{stage}/{provider_lower}/{year}/{month}/{day}/{hour}/trips.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_path_matches_canonical_layout() {
        assert_eq!(
            data_path("staging", "sample_co", 2020, 1, 1, 1),
            "staging/sample_co/2020/1/1/1/trips.json"
        );
    }
}
