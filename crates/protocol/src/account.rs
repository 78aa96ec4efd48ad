//! Identity record delivered once the login is approved.

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// CDN base for avatar images.
pub const AVATAR_CDN: &str = "https://cdn.discordapp.com/avatars";

/// Number of colon-delimited fields in a `pending_finish` payload.
const ACCOUNT_FIELDS: usize = 4;

/// The account that approved the login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account snowflake ID.
    pub id: String,
    /// Four-digit discriminator.
    pub discriminator: String,
    /// Full avatar URL, synthesized from the ID and avatar hash.
    pub avatar_url: String,
    /// Account username.
    pub username: String,
}

impl Account {
    /// Parses the decrypted `pending_finish` payload.
    ///
    /// The payload is four colon-delimited fields in fixed order: id,
    /// discriminator, avatar hash, username. Any other field count is
    /// rejected rather than producing a record with missing fields.
    pub fn parse(raw: &str) -> Result<Self> {
        let fields: Vec<&str> = raw.split(':').collect();
        if fields.len() != ACCOUNT_FIELDS {
            return Err(ProtocolError::MalformedAccount {
                fields: fields.len(),
            });
        }

        let (id, discriminator, avatar_hash, username) =
            (fields[0], fields[1], fields[2], fields[3]);

        Ok(Self {
            id: id.to_string(),
            discriminator: discriminator.to_string(),
            avatar_url: format!("{}/{}/{}.png", AVATAR_CDN, id, avatar_hash),
            username: username.to_string(),
        })
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.username, self.discriminator)
    }
}
