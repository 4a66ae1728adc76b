//! Per-table row-scope rewriting.

use super::Caller;
use crate::query::Table;
use crate::store::Predicate;

/// Add the caller's row restriction for `table` to `predicates`.
///
/// Administrators pass through untouched. For ward members the match over
/// [`Table`] is exhaustive, so a new table cannot be added without deciding
/// its scope.
pub fn apply_scope(caller: &Caller, table: Table, predicates: &mut Vec<Predicate>) {
    let (ward_id, booth_ids) = match caller {
        Caller::Admin => return,
        Caller::WardMember { ward_id, booth_ids } => (ward_id, booth_ids),
    };

    let restriction = match table {
        Table::Voters if booth_ids.is_empty() => Some(Predicate::Unsatisfiable),
        Table::Voters => Some(Predicate::is_in("booth_id", booth_ids.clone())),
        Table::Booths | Table::Candidates => Some(Predicate::eq("ward_id", ward_id.clone())),
        Table::Wards => Some(Predicate::eq("id", ward_id.clone())),
        Table::Panchayats => None,
    };

    if let Some(predicate) = restriction {
        tracing::trace!(table = %table, predicate = ?predicate, "Applying row scope");
        predicates.push(predicate);
    }
}
