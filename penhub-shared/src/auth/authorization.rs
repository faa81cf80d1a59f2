/// Ownership checks
///
/// Only the owner of a resource may mutate it. Books are owned by their
/// author, chapters by the author of their book, likes by the user who left
/// them. Reads are governed by visibility rules in the store instead.
///
/// # Example
///
/// ```
/// use penhub_shared::auth::authorization::{can_mutate, require_ownership};
///
/// assert!(can_mutate(1, 1));
/// assert!(require_ownership(2, 1).is_err());
/// ```

use crate::models::DbId;

/// Caller is not the owner of the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Not authorized to modify this resource")]
pub struct NotOwner;

/// True iff `caller_id` owns the resource
pub fn can_mutate(caller_id: DbId, resource_owner_id: DbId) -> bool {
    caller_id == resource_owner_id
}

/// Fails with [`NotOwner`] unless `caller_id` owns the resource
pub fn require_ownership(caller_id: DbId, resource_owner_id: DbId) -> Result<(), NotOwner> {
    if !can_mutate(caller_id, resource_owner_id) {
        return Err(NotOwner);
    }

    Ok(())
}
