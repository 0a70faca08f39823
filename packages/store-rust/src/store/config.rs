/// Store-level configuration.
///
/// Controls where the local backend persists the collection.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Fixed key the local backend serializes the record list under.
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: "discount_codes".to_string(),
        }
    }
}
