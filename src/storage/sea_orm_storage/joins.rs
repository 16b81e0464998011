//! Batched lookups used to assemble joined rows.
//!
//! Listings fetch their base rows first, then resolve related records with
//! one `IN (...)` query per table and stitch them together in memory.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use super::db_err;
use crate::entity::{academic_years, class_groups, enrollments, students, subjects, users};
use crate::errors::Result;
use crate::models::academics::entities::{ClassGroupDetail, EnrollmentDetail};

fn unique_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

pub(super) async fn students_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, students::Model>> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = students::Entity::find()
        .filter(students::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err("Failed to load students"))?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

pub(super) async fn users_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, users::Model>> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err("Failed to load users"))?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

pub(super) async fn class_groups_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, class_groups::Model>> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = class_groups::Entity::find()
        .filter(class_groups::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err("Failed to load class groups"))?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

pub(super) async fn subjects_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, subjects::Model>> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = subjects::Entity::find()
        .filter(subjects::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err("Failed to load subjects"))?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

pub(super) async fn years_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, academic_years::Model>> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = academic_years::Entity::find()
        .filter(academic_years::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err("Failed to load academic years"))?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

/// Attaches the academic year name to each class group.
pub(super) async fn class_group_details<C: ConnectionTrait>(
    db: &C,
    groups: Vec<class_groups::Model>,
) -> Result<Vec<ClassGroupDetail>> {
    let years = years_by_ids(db, groups.iter().map(|g| g.academic_year_id)).await?;
    Ok(groups
        .into_iter()
        .map(|g| {
            let academic_year_name = years
                .get(&g.academic_year_id)
                .map(|y| y.name.clone())
                .unwrap_or_default();
            ClassGroupDetail {
                class_group: g.into_class_group(),
                academic_year_name,
            }
        })
        .collect())
}

/// Resolves class group and academic year names for enrollments.
pub(super) async fn enrollment_details<C: ConnectionTrait>(
    db: &C,
    rows: Vec<enrollments::Model>,
) -> Result<Vec<EnrollmentDetail>> {
    let groups = class_groups_by_ids(db, rows.iter().map(|e| e.class_group_id)).await?;
    let years = years_by_ids(db, rows.iter().map(|e| e.academic_year_id)).await?;
    Ok(rows
        .into_iter()
        .map(|e| {
            let group = groups.get(&e.class_group_id);
            let year = years.get(&e.academic_year_id);
            EnrollmentDetail {
                id: e.id,
                student_id: e.student_id,
                class_group_id: e.class_group_id,
                class_group_name: group.map(|g| g.name.clone()).unwrap_or_default(),
                grade_level: group.map(|g| g.grade_level.clone()).unwrap_or_default(),
                academic_year_id: e.academic_year_id,
                academic_year_name: year.map(|y| y.name.clone()).unwrap_or_default(),
                is_current_year: year.is_some_and(|y| y.is_current),
            }
        })
        .collect())
}
