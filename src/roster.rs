//! CSV roster loading
//!
//! One [`Recipient`] per roster row, keyed by the header names. The roster
//! must carry at least `name` and `email` columns; any extra columns are
//! passed through to the render context untouched.

use std::collections::HashMap;
use std::path::Path;

use crate::{Error, Result};

/// One roster row: field name to string value, immutable once read.
#[derive(Debug, Clone)]
pub struct Recipient {
    fields: HashMap<String, String>,
}

impl Recipient {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// The recipient's display name as written in the roster.
    pub fn name(&self) -> Result<&str> {
        self.get("name")
            .ok_or_else(|| Error::MissingKey("name".to_string()))
    }

    /// The recipient's email address, also the output folder name.
    pub fn email(&self) -> Result<&str> {
        self.get("email")
            .ok_or_else(|| Error::MissingKey("email".to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

/// Read every row of the roster file.
pub fn load(path: &Path) -> Result<Vec<Recipient>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut recipients = Vec::new();
    for row in reader.deserialize::<HashMap<String, String>>() {
        recipients.push(Recipient::new(row?));
    }
    Ok(recipients)
}
