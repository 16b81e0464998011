use super::{SeaOrmStorage, db_err, now_ts, rbac, write_err};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{NewUser, UserChanges, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::search_term;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_user_impl(&self, user: NewUser) -> Result<User> {
        let now = now_ts();
        let is_teacher = user.role == UserRole::Teacher;

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let model = ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            phone: Set(user.phone),
            preferred_language: Set(user.preferred_language.to_string()),
            staff_code: Set(user.staff_code),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(&txn)
            .await
            .map_err(write_err("Failed to create user"))?;

        if is_teacher {
            rbac::grant_teacher_role(&txn, created.id).await?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit user"))?;

        Ok(created.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query user"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query user"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query user"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query user"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Users::find();

        if let Some(term) = search_term(query.search.as_deref()) {
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&term))
                    .add(Column::Email.contains(&term))
                    .add(Column::FirstName.contains(&term))
                    .add(Column::LastName.contains(&term))
                    .add(Column::StaffCode.contains(&term)),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count users"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("Failed to count user pages"))?;
        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("Failed to list users"))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now_ts()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to update last login"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn accept_terms_impl(&self, id: i64) -> Result<Option<User>> {
        let now = now_ts();
        Users::update_many()
            .col_expr(Column::TermsAcceptedAt, sea_orm::sea_query::Expr::value(now))
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::TermsAcceptedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to accept terms"))?;

        self.get_user_by_id_impl(id).await
    }

    pub async fn update_user_impl(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let Some(existing) = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query user"))?
        else {
            return Ok(None);
        };

        let becomes_teacher = changes.role == Some(UserRole::Teacher)
            && existing.role != UserRole::Teacher.as_str();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };

        if let Some(email) = changes.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            model.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = changes.status {
            model.status = Set(status.to_string());
        }
        if let Some(first_name) = changes.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            model.last_name = Set(last_name);
        }
        if let Some(phone) = changes.phone {
            model.phone = Set((!phone.trim().is_empty()).then_some(phone));
        }
        if let Some(language) = changes.preferred_language {
            model.preferred_language = Set(language.to_string());
        }
        if let Some(staff_code) = changes.staff_code {
            model.staff_code = Set((!staff_code.trim().is_empty()).then_some(staff_code));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let updated = model
            .update(&txn)
            .await
            .map_err(write_err("Failed to update user"))?;

        if becomes_teacher {
            rbac::grant_teacher_role(&txn, id).await?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit user update"))?;

        Ok(Some(updated.into_user()))
    }

    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete user"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count users"))
    }

    pub async fn count_users_by_roles_impl(&self, roles: &[UserRole]) -> Result<u64> {
        Users::find()
            .filter(Column::Role.is_in(roles.iter().map(|r| r.as_str())))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count users"))
    }

    pub async fn check_usernames_exist_impl(&self, usernames: &[String]) -> Result<Vec<String>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        Users::find()
            .select_only()
            .column(Column::Username)
            .filter(Column::Username.is_in(usernames.iter().map(String::as_str)))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to check usernames"))
    }

    pub async fn check_emails_exist_impl(&self, emails: &[String]) -> Result<Vec<String>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }
        Users::find()
            .select_only()
            .column(Column::Email)
            .filter(Column::Email.is_in(emails.iter().map(String::as_str)))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to check emails"))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::rbac::entities::perms;
    use crate::models::users::entities::PreferredLanguage;
    use crate::storage::Storage;

    pub(crate) fn new_user(username: &str, role: UserRole) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            role,
            first_name: "First".to_string(),
            last_name: username.to_string(),
            phone: None,
            preferred_language: PreferredLanguage::English,
            staff_code: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let user = storage
            .create_user(new_user("rmoyo", UserRole::Parent))
            .await
            .unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert!(!user.has_accepted_terms());

        let by_email = storage
            .get_user_by_username_or_email("rmoyo@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        let dup = storage.create_user(new_user("rmoyo", UserRole::Parent)).await;
        assert!(matches!(dup, Err(crate::errors::BusyBeeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_teacher_gets_teacher_role() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let teacher = storage
            .create_user(new_user("tdube", UserRole::Teacher))
            .await
            .unwrap();
        let parent = storage
            .create_user(new_user("pdube", UserRole::Parent))
            .await
            .unwrap();

        assert!(
            storage
                .user_has_permission(teacher.id, perms::VIEW_STUDENT)
                .await
                .unwrap()
        );
        assert!(
            !storage
                .user_has_permission(parent.id, perms::VIEW_STUDENT)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_existing_checks() {
        let storage = SeaOrmStorage::new_in_memory().await;
        for (name, role) in [
            ("alpha", UserRole::Admin),
            ("bravo", UserRole::Teacher),
            ("charlie", UserRole::Parent),
        ] {
            storage.create_user(new_user(name, role)).await.unwrap();
        }

        let page = storage
            .list_users_with_pagination(UserListQuery {
                page: 1,
                size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.items.len(), 2);

        let teachers = storage
            .list_users_with_pagination(UserListQuery {
                page: 1,
                size: 20,
                role: Some(UserRole::Teacher),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(teachers.items.len(), 1);

        let searched = storage
            .list_users_with_pagination(UserListQuery {
                page: 1,
                size: 20,
                search: Some("char".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.items[0].username, "charlie");

        let taken = storage
            .check_usernames_exist(&["alpha".to_string(), "zulu".to_string()])
            .await
            .unwrap();
        assert_eq!(taken, vec!["alpha".to_string()]);

        let staff = storage
            .count_users_by_roles(&[UserRole::Principal, UserRole::Admin, UserRole::Teacher])
            .await
            .unwrap();
        assert_eq!(staff, 2);
    }

    #[tokio::test]
    async fn test_accept_terms_and_update() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let user = storage
            .create_user(new_user("kncube", UserRole::Parent))
            .await
            .unwrap();

        let accepted = storage.accept_terms(user.id).await.unwrap().unwrap();
        let stamp = accepted.terms_accepted_at;
        assert!(stamp.is_some());
        let again = storage.accept_terms(user.id).await.unwrap().unwrap();
        assert_eq!(again.terms_accepted_at, stamp);

        let updated = storage
            .update_user(
                user.id,
                UserChanges {
                    status: Some(UserStatus::Inactive),
                    phone: Some("+263771000000".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, UserStatus::Inactive);
        assert_eq!(updated.phone.as_deref(), Some("+263771000000"));

        assert!(storage.update_user(9999, UserChanges::default()).await.unwrap().is_none());
        assert!(storage.delete_user(user.id).await.unwrap());
        assert!(storage.get_user_by_id(user.id).await.unwrap().is_none());
    }
}
