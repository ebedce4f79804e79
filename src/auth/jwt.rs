use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode, errors::Error};

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
pub mod testing {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use crate::model::role::Role;
    use crate::models::Claims;

    pub const TEST_SECRET: &str = "test-secret";

    pub fn token_for(id: &str, role: Role, branch_id: Option<&str>) -> String {
        let claims = Claims {
            sub: id.to_string(),
            name: format!("{id} name"),
            role: role.as_str().to_string(),
            branch_id: branch_id.map(str::to_string),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }
}
