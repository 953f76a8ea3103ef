//! Transfer identities.
//!
//! An identity is a UUID-formatted token that correlates every request of
//! one logical transfer. Identities are stored by whatever element hosts the
//! transfer; duplicating that element duplicates the identity, so callers
//! run [`resolve_collision`] whenever the element is (re)configured.

use std::fmt;

use tracing::debug;

use crate::TransferError;

/// An opaque, UUID-formatted transfer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferIdentity {
    id: String,
}

impl TransferIdentity {
    /// Generates a fresh identity from the OS secure random source.
    ///
    /// Fails only when no secure random source is available; there is no
    /// fallback to a weaker scheme.
    pub fn generate() -> Result<Self, TransferError> {
        let mut bytes = [0u8; 16];
        getrandom::fill(&mut bytes).map_err(TransferError::Entropy)?;
        let id = uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string();
        Ok(Self { id })
    }

    /// Wraps an existing, non-empty identifier.
    pub fn from_existing(id: impl Into<String>) -> Result<Self, TransferError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TransferError::InvalidArgument(
                "transfer id must not be empty".into(),
            ));
        }
        Ok(Self { id })
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Consumes the identity and returns the identifier.
    pub fn into_string(self) -> String {
        self.id
    }
}

impl fmt::Display for TransferIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl AsRef<str> for TransferIdentity {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// Returns `current` unchanged when it has non-whitespace content, otherwise
/// a newly generated identifier.
pub fn ensure(current: Option<&str>) -> Result<String, TransferError> {
    match current {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => {
            let id = TransferIdentity::generate()?.into_string();
            debug!(id = %id, "transfer id initialized");
            Ok(id)
        }
    }
}

/// Outcome of a collision check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub id: String,
    pub changed: bool,
}

/// Replaces `current` with a fresh identifier if any sibling holds it.
///
/// `sibling_ids` must not include the owner of `current` itself. The
/// caller writes the returned id back into its own state.
pub fn resolve_collision<I, S>(current: &str, sibling_ids: I) -> Result<Resolution, TransferError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let collides = sibling_ids.into_iter().any(|s| s.as_ref() == current);
    if !collides {
        return Ok(Resolution {
            id: current.to_string(),
            changed: false,
        });
    }

    let mut fresh = TransferIdentity::generate()?.into_string();
    // A regenerated id must differ from the one it replaces.
    while fresh == current {
        fresh = TransferIdentity::generate()?.into_string();
    }
    debug!(old = %current, new = %fresh, "duplicate transfer id replaced");
    Ok(Resolution {
        id: fresh,
        changed: true,
    })
}

/// Returns `true` if `id` is a syntactically valid UUID string.
pub fn is_well_formed(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}
