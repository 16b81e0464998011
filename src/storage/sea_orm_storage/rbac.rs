use std::collections::HashMap;

use super::{SeaOrmStorage, db_err, joins, now_ts, write_err};
use crate::entity::{permissions, role_permissions, roles, user_roles};
use crate::errors::{BusyBeeError, Result};
use crate::models::rbac::{
    entities::{Permission, Role, RoleAssignment, TEACHER_ROLE_NAME, TEACHER_ROLE_PERMISSIONS},
    requests::UpdateRoleRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

async fn ensure_permission_model<C: ConnectionTrait>(
    db: &C,
    code: &str,
    name: &str,
) -> Result<permissions::Model> {
    let existing = permissions::Entity::find()
        .filter(permissions::Column::Code.eq(code))
        .one(db)
        .await
        .map_err(db_err("Failed to query permission"))?;
    if let Some(p) = existing {
        return Ok(p);
    }

    permissions::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to create permission"))
}

/// Resolves permission codes to ids; unknown codes are rejected.
async fn resolve_codes<C: ConnectionTrait>(db: &C, codes: &[String]) -> Result<Vec<i64>> {
    let mut wanted: Vec<String> = codes.iter().map(|c| c.trim().to_string()).collect();
    wanted.retain(|c| !c.is_empty());
    wanted.sort();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let found = permissions::Entity::find()
        .filter(permissions::Column::Code.is_in(wanted.clone()))
        .all(db)
        .await
        .map_err(db_err("Failed to load permissions"))?;

    let unknown: Vec<&str> = wanted
        .iter()
        .filter(|c| !found.iter().any(|p| &p.code == *c))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(BusyBeeError::validation(format!(
            "Unknown permission codes: {}",
            unknown.join(", ")
        )));
    }
    Ok(found.into_iter().map(|p| p.id).collect())
}

async fn set_role_permissions<C: ConnectionTrait>(
    db: &C,
    role_id: i64,
    permission_ids: &[i64],
) -> Result<()> {
    role_permissions::Entity::delete_many()
        .filter(role_permissions::Column::RoleId.eq(role_id))
        .exec(db)
        .await
        .map_err(db_err("Failed to clear role permissions"))?;

    if permission_ids.is_empty() {
        return Ok(());
    }
    let rows = permission_ids.iter().map(|pid| role_permissions::ActiveModel {
        role_id: Set(role_id),
        permission_id: Set(*pid),
        ..Default::default()
    });
    role_permissions::Entity::insert_many(rows)
        .exec(db)
        .await
        .map_err(write_err("Failed to set role permissions"))?;
    Ok(())
}

/// Attaches permission lists to role rows.
async fn with_permissions<C: ConnectionTrait>(
    db: &C,
    rows: Vec<roles::Model>,
) -> Result<Vec<Role>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let links = role_permissions::Entity::find()
        .filter(role_permissions::Column::RoleId.is_in(rows.iter().map(|r| r.id).collect::<Vec<_>>()))
        .all(db)
        .await
        .map_err(db_err("Failed to load role permissions"))?;

    let mut permission_ids: Vec<i64> = links.iter().map(|l| l.permission_id).collect();
    permission_ids.sort_unstable();
    permission_ids.dedup();
    let perms: HashMap<i64, permissions::Model> = if permission_ids.is_empty() {
        HashMap::new()
    } else {
        permissions::Entity::find()
            .filter(permissions::Column::Id.is_in(permission_ids))
            .all(db)
            .await
            .map_err(db_err("Failed to load permissions"))?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let mut by_role: HashMap<i64, Vec<Permission>> = HashMap::new();
    for link in links {
        if let Some(p) = perms.get(&link.permission_id) {
            by_role
                .entry(link.role_id)
                .or_default()
                .push(p.clone().into_permission());
        }
    }

    Ok(rows
        .into_iter()
        .map(|r| {
            let mut list = by_role.remove(&r.id).unwrap_or_default();
            list.sort_by(|a, b| a.code.cmp(&b.code));
            r.into_role(list)
        })
        .collect())
}

/// Teacher role with its baseline permissions, created on first use.
async fn ensure_teacher_role<C: ConnectionTrait>(db: &C) -> Result<roles::Model> {
    let existing = roles::Entity::find()
        .filter(roles::Column::Name.eq(TEACHER_ROLE_NAME))
        .one(db)
        .await
        .map_err(db_err("Failed to query teacher role"))?;
    if let Some(role) = existing {
        return Ok(role);
    }

    let role = roles::ActiveModel {
        name: Set(TEACHER_ROLE_NAME.to_string()),
        description: Set("Default permissions for teaching staff".to_string()),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to create teacher role"))?;

    let mut ids = Vec::with_capacity(TEACHER_ROLE_PERMISSIONS.len());
    for code in TEACHER_ROLE_PERMISSIONS {
        ids.push(ensure_permission_model(db, code, code).await?.id);
    }
    set_role_permissions(db, role.id, &ids).await?;

    Ok(role)
}

/// Assigns the Teacher role to `user_id` unless already held.
pub(super) async fn grant_teacher_role<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<()> {
    let role = ensure_teacher_role(db).await?;
    assign(db, user_id, role.id).await?;
    Ok(())
}

async fn assign<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    role_id: i64,
) -> Result<(user_roles::Model, bool)> {
    let existing = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id))
        .filter(user_roles::Column::RoleId.eq(role_id))
        .one(db)
        .await
        .map_err(db_err("Failed to query role assignment"))?;
    if let Some(row) = existing {
        return Ok((row, false));
    }

    let created = user_roles::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(role_id),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to assign role"))?;
    Ok((created, true))
}

async fn assignment_rows<C: ConnectionTrait>(
    db: &C,
    rows: Vec<user_roles::Model>,
) -> Result<Vec<RoleAssignment>> {
    let users = joins::users_by_ids(db, rows.iter().map(|r| r.user_id)).await?;
    let role_names: HashMap<i64, String> = if rows.is_empty() {
        HashMap::new()
    } else {
        roles::Entity::find()
            .filter(roles::Column::Id.is_in(rows.iter().map(|r| r.role_id).collect::<Vec<_>>()))
            .all(db)
            .await
            .map_err(db_err("Failed to load roles"))?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|r| RoleAssignment {
            id: r.id,
            user_id: r.user_id,
            username: users
                .get(&r.user_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            role_id: r.role_id,
            role_name: role_names.get(&r.role_id).cloned().unwrap_or_default(),
            created_at: chrono::DateTime::<chrono::Utc>::from_timestamp(r.created_at, 0)
                .unwrap_or_default(),
        })
        .collect())
}

impl SeaOrmStorage {
    pub async fn list_permissions_impl(&self) -> Result<Vec<Permission>> {
        let rows = permissions::Entity::find()
            .order_by_asc(permissions::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list permissions"))?;

        Ok(rows.into_iter().map(|m| m.into_permission()).collect())
    }

    pub async fn create_permission_impl(&self, code: &str, name: &str) -> Result<Permission> {
        let created = permissions::ActiveModel {
            code: Set(code.trim().to_string()),
            name: Set(name.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create permission"))?;

        Ok(created.into_permission())
    }

    pub async fn ensure_permission_impl(&self, code: &str, name: &str) -> Result<Permission> {
        Ok(ensure_permission_model(&self.db, code, name)
            .await?
            .into_permission())
    }

    pub async fn list_roles_impl(&self) -> Result<Vec<Role>> {
        let rows = roles::Entity::find()
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list roles"))?;

        with_permissions(&self.db, rows).await
    }

    pub async fn get_role_impl(&self, id: i64) -> Result<Option<Role>> {
        let Some(row) = roles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query role"))?
        else {
            return Ok(None);
        };

        Ok(with_permissions(&self.db, vec![row]).await?.pop())
    }

    pub async fn get_role_by_name_impl(&self, name: &str) -> Result<Option<Role>> {
        let Some(row) = roles::Entity::find()
            .filter(roles::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query role"))?
        else {
            return Ok(None);
        };

        Ok(with_permissions(&self.db, vec![row]).await?.pop())
    }

    pub async fn create_role_impl(
        &self,
        name: &str,
        description: &str,
        codes: &[String],
    ) -> Result<Role> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let permission_ids = resolve_codes(&txn, codes).await?;
        let role = roles::ActiveModel {
            name: Set(name.trim().to_string()),
            description: Set(description.trim().to_string()),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(write_err("Failed to create role"))?;
        set_role_permissions(&txn, role.id, &permission_ids).await?;

        let created = with_permissions(&txn, vec![role]).await?.pop();
        txn.commit()
            .await
            .map_err(db_err("Failed to commit role"))?;

        created.ok_or_else(|| BusyBeeError::database_operation("Created role vanished"))
    }

    pub async fn update_role_impl(&self, id: i64, req: UpdateRoleRequest) -> Result<Option<Role>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let Some(role) = roles::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query role"))?
        else {
            return Ok(None);
        };

        let mut model: roles::ActiveModel = role.into();
        if let Some(name) = req.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = req.description {
            model.description = Set(description.trim().to_string());
        }
        let updated = model
            .update(&txn)
            .await
            .map_err(write_err("Failed to update role"))?;

        if let Some(codes) = req.permissions {
            let ids = resolve_codes(&txn, &codes).await?;
            set_role_permissions(&txn, id, &ids).await?;
        }

        let role = with_permissions(&txn, vec![updated]).await?.pop();
        txn.commit()
            .await
            .map_err(db_err("Failed to commit role"))?;

        Ok(role)
    }

    pub async fn delete_role_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let Some(role) = roles::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query role"))?
        else {
            return Ok(false);
        };

        role_permissions::Entity::delete_many()
            .filter(role_permissions::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err("Failed to delete role permissions"))?;
        user_roles::Entity::delete_many()
            .filter(user_roles::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err("Failed to delete role assignments"))?;
        role.delete(&txn)
            .await
            .map_err(db_err("Failed to delete role"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit role deletion"))?;
        Ok(true)
    }

    pub async fn list_assignments_impl(&self, limit: u64) -> Result<Vec<RoleAssignment>> {
        let rows = user_roles::Entity::find()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list role assignments"))?;

        let mut out = assignment_rows(&self.db, rows).await?;
        out.sort_by(|a, b| {
            a.username
                .cmp(&b.username)
                .then_with(|| a.role_name.cmp(&b.role_name))
        });
        out.truncate(limit as usize);
        Ok(out)
    }

    pub async fn assign_role_impl(
        &self,
        user_id: i64,
        role_id: i64,
    ) -> Result<(RoleAssignment, bool)> {
        let (row, created) = assign(&self.db, user_id, role_id).await?;
        let assignment = assignment_rows(&self.db, vec![row])
            .await?
            .pop()
            .ok_or_else(|| BusyBeeError::database_operation("Role assignment vanished"))?;
        Ok((assignment, created))
    }

    pub async fn revoke_assignment_impl(&self, id: i64) -> Result<bool> {
        let res = user_roles::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to revoke role"))?;
        Ok(res.rows_affected > 0)
    }

    pub async fn user_has_permission_impl(&self, user_id: i64, code: &str) -> Result<bool> {
        let Some(permission) = permissions::Entity::find()
            .filter(permissions::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query permission"))?
        else {
            return Ok(false);
        };

        let role_ids: Vec<i64> = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load user roles"))?
            .into_iter()
            .map(|r| r.role_id)
            .collect();
        if role_ids.is_empty() {
            return Ok(false);
        }

        let hits = role_permissions::Entity::find()
            .filter(role_permissions::Column::RoleId.is_in(role_ids))
            .filter(role_permissions::Column::PermissionId.eq(permission.id))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to check permission"))?;
        Ok(hits > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::entities::perms;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    #[tokio::test]
    async fn test_seeded_permissions() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let list = storage.list_permissions().await.unwrap();
        assert!(list.iter().any(|p| p.code == perms::VERIFY_POP));
        assert!(list.iter().any(|p| p.code == perms::MANAGE_APPLICATIONS));

        let again = storage
            .ensure_permission(perms::VERIFY_POP, "ignored")
            .await
            .unwrap();
        assert_eq!(list.len(), storage.list_permissions().await.unwrap().len());
        assert!(list.iter().any(|p| p.id == again.id));
    }

    #[tokio::test]
    async fn test_role_permissions_grant_access() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let bursar = storage
            .create_user(new_user("bursar", UserRole::Admin))
            .await
            .unwrap();

        let role = storage
            .create_role(
                "Bursar",
                "Fees office",
                &[perms::RECORD_PAYMENT.to_string(), perms::VERIFY_POP.to_string()],
            )
            .await
            .unwrap();
        assert_eq!(role.permissions.len(), 2);

        assert!(!storage.user_has_permission(bursar.id, perms::VERIFY_POP).await.unwrap());
        let (assignment, created) = storage.assign_role(bursar.id, role.id).await.unwrap();
        assert!(created);
        assert_eq!(assignment.role_name, "Bursar");
        let (_, again) = storage.assign_role(bursar.id, role.id).await.unwrap();
        assert!(!again);
        assert!(storage.user_has_permission(bursar.id, perms::VERIFY_POP).await.unwrap());
        assert!(!storage.user_has_permission(bursar.id, perms::ENTER_GRADES).await.unwrap());

        let narrowed = storage
            .update_role(
                role.id,
                UpdateRoleRequest {
                    permissions: Some(vec![perms::RECORD_PAYMENT.to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(narrowed.permissions.len(), 1);
        assert!(!storage.user_has_permission(bursar.id, perms::VERIFY_POP).await.unwrap());

        assert!(storage.revoke_assignment(assignment.id).await.unwrap());
        assert!(!storage.user_has_permission(bursar.id, perms::RECORD_PAYMENT).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_code_rejected() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let res = storage
            .create_role("Odd", "", &["library.lend".to_string()])
            .await;
        assert!(matches!(res, Err(BusyBeeError::Validation(_))));
        assert!(storage.get_role_by_name("Odd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_assignments_sorted_and_role_delete() {
        let storage = SeaOrmStorage::new_in_memory().await;
        storage.create_user(new_user("zed", UserRole::Teacher)).await.unwrap();
        let amy = storage.create_user(new_user("amy", UserRole::Teacher)).await.unwrap();
        let extra = storage.create_role("Exams", "", &[]).await.unwrap();
        storage.assign_role(amy.id, extra.id).await.unwrap();

        let list = storage.list_assignments(100).await.unwrap();
        let names: Vec<(&str, &str)> = list
            .iter()
            .map(|a| (a.username.as_str(), a.role_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("amy", "Exams"), ("amy", "Teacher"), ("zed", "Teacher")]
        );
        assert_eq!(storage.list_assignments(1).await.unwrap().len(), 1);

        assert!(storage.delete_role(extra.id).await.unwrap());
        assert!(!storage.delete_role(extra.id).await.unwrap());
        assert_eq!(storage.list_assignments(100).await.unwrap().len(), 2);
    }
}
