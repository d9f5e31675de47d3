use serde::{Deserialize, Serialize};

/// The person an account is registered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHolder {
    pub name: String,
    pub phone_number: String,
}

impl AccountHolder {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            phone_number: phone_number.into().trim().to_string(),
        }
    }

    /// Name to greet the holder with, falling back to the phone number.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.phone_number
        } else {
            &self.name
        }
    }
}
