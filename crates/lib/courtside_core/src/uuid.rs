// Helper for generating UUIDv7 (timestamp-sortable UUIDs)
//
// PostgreSQL does not natively support UUIDv7 for auto-generation.
// Grants and redemption codes are audited in creation order, so their ids
// are generated app-side as v7. Catalog tables keep PG's
// gen_random_uuid() (v4) since ordering there comes from position columns.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
