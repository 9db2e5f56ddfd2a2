use serde::{Deserialize, Serialize};

/// Identity key of a user record.
///
/// The upstream API hands out numeric ids, but nothing in the client relies
/// on that, so string ids are accepted too. Two records describe the same
/// entity iff their ids are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

/// A single user record as served by the users endpoint.
///
/// Records are treated as immutable snapshots: an edit produces a new
/// `User` that replaces the old one by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

impl User {
    /// Whether `other` is the same entity, regardless of field values.
    pub fn same_entity(&self, other: &User) -> bool {
        self.id == other.id
    }

    /// Avatar initials: first letter of the first two name parts.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .take(2)
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}
