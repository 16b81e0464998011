use chrono::NaiveDate;

use super::{SeaOrmStorage, db_err, joins, now_ts, write_err};
use crate::entity::student_guardians::{
    ActiveModel as GuardianActiveModel, Column as GuardianColumn, Entity as StudentGuardians,
};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    people::{
        entities::{GuardianSummary, Student, StudentStatus, normalize_student_code},
        requests::{CreateStudentRequest, UpdateStudentRequest},
        responses::StudentListResponse,
    },
};
use crate::utils::search_term;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

fn student_search(select: Select<Students>, search: Option<&str>) -> Select<Students> {
    match search_term(search) {
        Some(term) => select.filter(
            Condition::any()
                .add(Column::FirstName.contains(&term))
                .add(Column::LastName.contains(&term))
                .add(Column::StudentId.contains(term.to_uppercase()))
                .add(Column::Grade.contains(&term)),
        ),
        None => select,
    }
}

impl SeaOrmStorage {
    pub async fn list_students_with_pagination_impl(
        &self,
        page: u64,
        size: u64,
        search: Option<String>,
    ) -> Result<StudentListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let select = student_search(Students::find(), search.as_deref())
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count students"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("Failed to count student pages"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("Failed to list students"))?;

        Ok(StudentListResponse {
            items: rows.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    pub async fn list_students_ordered_impl(
        &self,
        search: Option<String>,
        limit: u64,
    ) -> Result<Vec<Student>> {
        let rows = student_search(Students::find(), search.as_deref())
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list students"))?;

        Ok(rows.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn count_students_impl(&self, status: Option<StudentStatus>) -> Result<u64> {
        let mut select = Students::find();
        if let Some(status) = status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        select
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count students"))
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let row = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query student"))?;

        Ok(row.map(|m| m.into_student()))
    }

    pub async fn get_student_by_code_impl(&self, code: &str) -> Result<Option<Student>> {
        let row = Students::find()
            .filter(Column::StudentId.eq(normalize_student_code(code)))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query student"))?;

        Ok(row.map(|m| m.into_student()))
    }

    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let now = now_ts();
        let model = ActiveModel {
            student_id: Set(normalize_student_code(&req.student_id)),
            first_name: Set(req.first_name.trim().to_string()),
            last_name: Set(req.last_name.trim().to_string()),
            date_of_birth: Set(req.date_of_birth),
            admission_date: Set(req.admission_date),
            grade: Set(req.grade.trim().to_string()),
            status: Set(req.status.unwrap_or(StudentStatus::Active).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(&self.db)
            .await
            .map_err(write_err("Failed to create student"))?;

        Ok(created.into_student())
    }

    pub async fn update_student_impl(
        &self,
        id: i64,
        req: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let Some(existing) = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query student"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(code) = req.student_id {
            model.student_id = Set(normalize_student_code(&code));
        }
        if let Some(first_name) = req.first_name {
            model.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = req.last_name {
            model.last_name = Set(last_name.trim().to_string());
        }
        if let Some(dob) = req.date_of_birth {
            model.date_of_birth = Set(dob);
        }
        if let Some(admission_date) = req.admission_date {
            model.admission_date = Set(Some(admission_date));
        }
        if let Some(grade) = req.grade {
            model.grade = Set(grade.trim().to_string());
        }
        if let Some(status) = req.status {
            model.status = Set(status.to_string());
        }
        model.updated_at = Set(now_ts());

        let updated = model
            .update(&self.db)
            .await
            .map_err(write_err("Failed to update student"))?;

        Ok(Some(updated.into_student()))
    }

    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let result = Students::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete student"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_guardians_impl(&self, student_id: i64) -> Result<Vec<GuardianSummary>> {
        let links = StudentGuardians::find()
            .filter(GuardianColumn::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list guardians"))?;

        let users = joins::users_by_ids(&self.db, links.iter().map(|l| l.user_id)).await?;
        let mut guardians: Vec<GuardianSummary> = links
            .iter()
            .filter_map(|l| users.get(&l.user_id))
            .map(|u| GuardianSummary {
                user_id: u.id,
                username: u.username.clone(),
                full_name: u.display_name(),
                email: u.email.clone(),
                phone: u.phone.clone(),
            })
            .collect();
        guardians.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(guardians)
    }

    pub async fn add_guardian_impl(&self, student_id: i64, user_id: i64) -> Result<bool> {
        if self.is_guardian_impl(user_id, student_id).await? {
            return Ok(false);
        }

        GuardianActiveModel {
            student_id: Set(student_id),
            user_id: Set(user_id),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to link guardian"))?;

        Ok(true)
    }

    pub async fn remove_guardian_impl(&self, student_id: i64, user_id: i64) -> Result<bool> {
        let result = StudentGuardians::delete_many()
            .filter(GuardianColumn::StudentId.eq(student_id))
            .filter(GuardianColumn::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to unlink guardian"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn is_guardian_impl(&self, user_id: i64, student_id: i64) -> Result<bool> {
        let count = StudentGuardians::find()
            .filter(GuardianColumn::StudentId.eq(student_id))
            .filter(GuardianColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to check guardian link"))?;

        Ok(count > 0)
    }

    pub async fn list_children_impl(&self, parent_id: i64) -> Result<Vec<Student>> {
        let student_ids: Vec<i64> = StudentGuardians::find()
            .select_only()
            .column(GuardianColumn::StudentId)
            .filter(GuardianColumn::UserId.eq(parent_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list children"))?;

        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Students::find()
            .filter(Column::Id.is_in(student_ids))
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list children"))?;

        Ok(rows.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn find_student_for_link_impl(
        &self,
        code: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<Student>> {
        let row = Students::find()
            .filter(Column::StudentId.eq(normalize_student_code(code)))
            .filter(Column::DateOfBirth.eq(date_of_birth))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query student"))?;

        Ok(row
            .filter(|m| m.last_name.trim().eq_ignore_ascii_case(last_name.trim()))
            .map(|m| m.into_student()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    pub(crate) fn new_student(code: &str, first: &str, last: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            student_id: code.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2015, 4, 18).unwrap(),
            admission_date: None,
            grade: "Grade 4".to_string(),
            status: None,
        }
    }

    #[tokio::test]
    async fn test_codes_are_case_insensitive() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let student = storage
            .create_student(new_student(" bb-001 ", "Tariro", "Moyo"))
            .await
            .unwrap();
        assert_eq!(student.student_id, "BB-001");
        assert_eq!(student.status, StudentStatus::Active);

        let found = storage.get_student_by_code("bb-001").await.unwrap().unwrap();
        assert_eq!(found.id, student.id);

        let dup = storage.create_student(new_student("BB-001", "X", "Y")).await;
        assert!(matches!(dup, Err(crate::errors::BusyBeeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_search_and_order() {
        let storage = SeaOrmStorage::new_in_memory().await;
        storage.create_student(new_student("S1", "Zoe", "Ncube")).await.unwrap();
        storage.create_student(new_student("S2", "Adam", "Banda")).await.unwrap();
        storage.create_student(new_student("S3", "Ben", "Banda")).await.unwrap();

        let all = storage.list_students_ordered(None, 300).await.unwrap();
        let names: Vec<String> = all.iter().map(|s| s.full_name()).collect();
        assert_eq!(names, vec!["Adam Banda", "Ben Banda", "Zoe Ncube"]);

        let page = storage
            .list_students_with_pagination(1, 20, Some("ncu".to_string()))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].student_id, "S1");

        let by_code = storage
            .list_students_ordered(Some("s2".to_string()), 300)
            .await
            .unwrap();
        assert_eq!(by_code.len(), 1);
    }

    #[tokio::test]
    async fn test_guardian_links_and_self_link_lookup() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let parent = storage
            .create_user(new_user("mum", UserRole::Parent))
            .await
            .unwrap();
        let student = storage
            .create_student(new_student("BB-7", "Rudo", "Chirwa"))
            .await
            .unwrap();

        assert!(storage.add_guardian(student.id, parent.id).await.unwrap());
        assert!(!storage.add_guardian(student.id, parent.id).await.unwrap());
        assert!(storage.is_guardian(parent.id, student.id).await.unwrap());
        assert_eq!(storage.list_children(parent.id).await.unwrap().len(), 1);
        let guardians = storage.list_guardians(student.id).await.unwrap();
        assert_eq!(guardians[0].username, "mum");

        let dob = NaiveDate::from_ymd_opt(2015, 4, 18).unwrap();
        let hit = storage
            .find_student_for_link("bb-7", "CHIRWA", dob)
            .await
            .unwrap();
        assert_eq!(hit.map(|s| s.id), Some(student.id));
        let wrong_dob = storage
            .find_student_for_link("BB-7", "Chirwa", NaiveDate::from_ymd_opt(2016, 1, 1).unwrap())
            .await
            .unwrap();
        assert!(wrong_dob.is_none());
        let wrong_name = storage
            .find_student_for_link("BB-7", "Moyo", dob)
            .await
            .unwrap();
        assert!(wrong_name.is_none());

        assert!(storage.remove_guardian(student.id, parent.id).await.unwrap());
        assert!(!storage.is_guardian(parent.id, student.id).await.unwrap());
    }
}
