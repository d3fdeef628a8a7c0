//! Reading member and hint documents from disk.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::{MemberProfile, NetworkInput, RelationshipHint};

/// Load a members document. Accepts either a bare member array or an object
/// with `members` and optional `relationships`.
pub fn load_members(path: impl AsRef<Path>) -> Result<(Vec<MemberProfile>, Vec<RelationshipHint>)> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let input: NetworkInput = serde_json::from_str(&raw)?;
    let (members, hints) = input.into_parts();
    tracing::debug!(
        path = %path.display(),
        members = members.len(),
        hints = hints.len(),
        "Loaded members"
    );
    Ok((members, hints))
}

/// Load a JSON array of relationship hints.
pub fn load_hints(path: impl AsRef<Path>) -> Result<Vec<RelationshipHint>> {
    let raw = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&raw)?)
}
