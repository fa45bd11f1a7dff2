//! Sample records for the `demo` command

use serde::{Deserialize, Serialize};

/// Collection the demo seeds
pub const DEMO_COLLECTION: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    /// Numeric text, kept as a string so leading zeros survive
    pub zipcode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub age: String,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

impl User {
    fn sample(name: &str, age: &str, zipcode: &str) -> Self {
        let initial = name.chars().next().unwrap_or('x').to_ascii_lowercase();
        Self {
            name: name.to_string(),
            age: age.to_string(),
            contact: format!("{}@email.{}", name, initial),
            company: format!("{} tech", name),
            address: Address {
                city: format!("{} city", name),
                state: format!("{} state", name),
                country: format!("{} Country", name),
                zipcode: zipcode.to_string(),
            },
        }
    }
}

/// John, Alex and Max
pub fn sample_users() -> Vec<User> {
    vec![
        User::sample("John", "23", "1001"),
        User::sample("Alex", "33", "2002"),
        User::sample("Max", "33", "3003"),
    ]
}
