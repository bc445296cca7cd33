use serde::{Deserialize, Serialize};

/// Name of the header the backend reads the patient's session token from.
pub const TOKEN_HEADER: &str = "token";

/// Session token presented by the patient, forwarded to the backend as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken(pub String);

impl UserToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
