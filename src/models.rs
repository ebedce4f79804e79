use serde::{Deserialize, Serialize};

/// Bearer token payload issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// staff id
    pub sub: String,
    pub name: String,
    pub role: String,
    /// Home branch; absent for chain-wide roles.
    #[serde(default)]
    pub branch_id: Option<String>,
    pub exp: usize,
}
