use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Issuer written into and required from every token.
pub const TOKEN_ISSUER: &str = "chat-api";

/// Role every authenticated account holds.
pub const USER_ROLE: &str = "user";

/// Additional role for administrative accounts.
pub const ADMIN_ROLE: &str = "admin";

/// Audience for regular accounts.
pub const REGULAR_AUDIENCE: &[&str] = &[USER_ROLE];

/// Audience for administrative accounts.
pub const ADMIN_AUDIENCE: &[&str] = &[USER_ROLE, ADMIN_ROLE];

/// Token lifetime from issuance to expiry.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Tolerated clock skew, in seconds, for all time-bound claims.
pub const LEEWAY_SECONDS: u64 = 10;

/// Registered JWT claims plus the embedded user identifier.
///
/// Self-contained: validity is decided entirely by signature and claim checks,
/// there is no server-side session record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Stable user identifier
    pub uid: String,

    /// Issuer
    pub iss: String,

    /// Audience (role set)
    pub aud: Vec<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp), equal to `iat`
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Position of a token on its validity timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidity {
    NotYetValid,
    Valid,
    Expired,
}

impl Claims {
    /// Create claims for a user issued now.
    ///
    /// # Arguments
    /// * `username` - Account username (becomes `sub`)
    /// * `user_id` - Stable account identifier (becomes `uid`)
    /// * `audience` - Role set, e.g. [`REGULAR_AUDIENCE`]
    ///
    /// # Returns
    /// Claims expiring [`TOKEN_LIFETIME_HOURS`] after issuance
    pub fn for_user(username: impl ToString, user_id: impl ToString, audience: &[&str]) -> Self {
        Self::for_user_at(username, user_id, audience, Utc::now())
    }

    /// Create claims for a user issued at an explicit instant.
    pub fn for_user_at(
        username: impl ToString,
        user_id: impl ToString,
        audience: &[&str],
        issued_at: DateTime<Utc>,
    ) -> Self {
        let expiration = issued_at + Duration::hours(TOKEN_LIFETIME_HOURS);

        Self {
            sub: username.to_string(),
            uid: user_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            aud: audience.iter().map(|role| role.to_string()).collect(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Check whether the audience grants a role.
    pub fn has_role(&self, role: &str) -> bool {
        self.aud.iter().any(|r| r == role)
    }

    /// Classify the token against a clock reading.
    ///
    /// `nbf` and `iat` may lie up to `leeway` seconds in the future; `exp` may
    /// lie up to `leeway` seconds in the past.
    pub fn validity_at(&self, current_timestamp: i64, leeway: u64) -> TokenValidity {
        let leeway = leeway as i64;

        if self.nbf > current_timestamp + leeway || self.iat > current_timestamp + leeway {
            TokenValidity::NotYetValid
        } else if current_timestamp > self.exp + leeway {
            TokenValidity::Expired
        } else {
            TokenValidity::Valid
        }
    }
}
