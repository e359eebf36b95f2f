use serde::{Deserialize, Serialize};

/// One entry of the store master data loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub store_id: String,
    pub store_name: String,
    pub area_code: String,
}
