//! File/person participation link.

use super::{FileId, PersonId};
use serde::{Deserialize, Serialize};

/// One `participation` row. References, not ownership: either side may be
/// deactivated (persons) without the link being treated as broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub file_id: FileId,
    pub person_id: PersonId,
    /// `false` when the indexer was unsure about the name match.
    pub is_certain: bool,
}
