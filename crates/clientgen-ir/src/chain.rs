//! Flattened fluent call chains.
//!
//! `RuleFor(x => x.Email).NotEmpty().MaximumLength(100)` and
//! `group.MapGet("/", Handler).WithName("List").Produces<Page>()` are both read
//! as an ordered list of calls, receiver-most first.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainCall {
    /// Method name without type arguments (`Produces`).
    pub name: String,
    /// Type argument text (`Produces<UserDto>` → `["UserDto"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<String>,
    /// Argument expression text, in order; named arguments keep their prefix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ChainCall {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            type_args: Vec::new(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn with_type_args(self, type_args: &[&str]) -> Self {
        Self {
            type_args: type_args.iter().map(|a| a.to_string()).collect(),
            ..self
        }
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}
