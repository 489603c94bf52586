//! Group membership: a shared `group_id` written across an element set.
//!
//! A group is derived from the elements carrying the same id; there is no
//! group entity. Membership changes are applied to every affected element in
//! one call.

#[cfg(test)]
#[path = "group_test.rs"]
mod group_test;

use uuid::Uuid;

use crate::doc::{DocStore, ElementId, GroupId};
use crate::error::GroupError;

/// Check whether `ids` may form a new group.
///
/// # Errors
///
/// Returns the first rule the set breaks: fewer than two distinct ids, an
/// unknown id, members under different parents, or a member already grouped.
pub fn validate_group(doc: &DocStore, ids: &[ElementId]) -> Result<(), GroupError> {
    let distinct = dedup(ids);
    if distinct.len() < 2 {
        return Err(GroupError::TooFew(distinct.len()));
    }
    let mut parent = None;
    for (i, id) in distinct.iter().enumerate() {
        let element = doc.get(id).ok_or(GroupError::UnknownElement(*id))?;
        if element.group_id.is_some() {
            return Err(GroupError::AlreadyGrouped(*id));
        }
        if i == 0 {
            parent = Some(element.parent_id);
        } else if parent != Some(element.parent_id) {
            return Err(GroupError::MixedParents);
        }
    }
    Ok(())
}

/// Write a fresh group id to every element of `ids`.
///
/// Returns the new id, or `None` when the set is rejected (nothing changes).
pub fn group(doc: &mut DocStore, ids: &[ElementId]) -> Option<GroupId> {
    if let Err(reason) = validate_group(doc, ids) {
        tracing::debug!(%reason, count = ids.len(), "group request ignored");
        return None;
    }
    let group_id = Uuid::new_v4();
    for id in dedup(ids) {
        if let Some(element) = doc.get_mut(&id) {
            element.group_id = Some(group_id);
        }
    }
    Some(group_id)
}

/// Clear the group of `id` from every member.
///
/// Returns the ids that were cleared; empty when `id` is unknown or ungrouped.
pub fn ungroup(doc: &mut DocStore, id: ElementId) -> Vec<ElementId> {
    let Some(group_id) = doc.get(&id).and_then(|e| e.group_id) else {
        return Vec::new();
    };
    clear_group(doc, group_id)
}

/// Members of `group_id`, in collection order.
#[must_use]
pub fn group_members(doc: &DocStore, group_id: GroupId) -> Vec<ElementId> {
    doc.iter()
        .filter(|e| e.group_id == Some(group_id))
        .map(|e| e.id)
        .collect()
}

/// Remove `id` alone from its group, dissolving the group if one member
/// would be left. Returns every id whose membership changed.
pub fn leave_group(doc: &mut DocStore, id: ElementId) -> Vec<ElementId> {
    let Some(group_id) = doc.get(&id).and_then(|e| e.group_id) else {
        return Vec::new();
    };
    if group_members(doc, group_id).len() <= 2 {
        return clear_group(doc, group_id);
    }
    if let Some(element) = doc.get_mut(&id) {
        element.group_id = None;
    }
    vec![id]
}

/// Clear every group left with a single member. Returns the cleared ids.
pub fn dissolve_singletons(doc: &mut DocStore) -> Vec<ElementId> {
    let mut counts: Vec<(GroupId, usize)> = Vec::new();
    for group_id in doc.iter().filter_map(|e| e.group_id) {
        match counts.iter_mut().find(|(g, _)| *g == group_id) {
            Some((_, n)) => *n += 1,
            None => counts.push((group_id, 1)),
        }
    }
    let mut cleared = Vec::new();
    for (group_id, n) in counts {
        if n < 2 {
            cleared.extend(clear_group(doc, group_id));
        }
    }
    cleared
}

/// Clear every group whose members sit under different parents. Returns the
/// cleared ids.
pub fn dissolve_mixed_parents(doc: &mut DocStore) -> Vec<ElementId> {
    let mut parents: Vec<(GroupId, Option<ElementId>, bool)> = Vec::new();
    for element in doc.iter() {
        let Some(group_id) = element.group_id else {
            continue;
        };
        match parents.iter_mut().find(|(g, _, _)| *g == group_id) {
            Some((_, parent, mixed)) => *mixed |= *parent != element.parent_id,
            None => parents.push((group_id, element.parent_id, false)),
        }
    }
    let mut cleared = Vec::new();
    for (group_id, _, mixed) in parents {
        if mixed {
            cleared.extend(clear_group(doc, group_id));
        }
    }
    cleared
}

fn clear_group(doc: &mut DocStore, group_id: GroupId) -> Vec<ElementId> {
    let mut cleared = Vec::new();
    for element in doc.iter_mut() {
        if element.group_id == Some(group_id) {
            element.group_id = None;
            cleared.push(element.id);
        }
    }
    cleared
}

fn dedup(ids: &[ElementId]) -> Vec<ElementId> {
    let mut out: Vec<ElementId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}
