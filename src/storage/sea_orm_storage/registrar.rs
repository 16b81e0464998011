use chrono::NaiveDate;

use super::{SeaOrmStorage, academics, db_err, now_ts, write_err};
use crate::entity::{
    academic_years, admission_applications, class_groups, student_guardians, students, users,
};
use crate::errors::{BusyBeeError, Result};
use crate::models::{
    people::entities::{StudentStatus, normalize_student_code},
    registrar::{
        entities::{
            AdmissionApplication, AdmissionRow, AdmissionRowOutcome, AdmitOutcome, AdmitPlan,
            ApplicationCounts, ApplicationStatus, ParentSpec,
        },
        requests::CreateApplicationRequest,
    },
    users::entities::{PreferredLanguage, UserRole, UserStatus},
};
use crate::utils::search_term;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Fields used when a student row has to be created.
struct StudentSeed<'a> {
    code: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    date_of_birth: NaiveDate,
    grade: &'a str,
    admission_date: Option<NaiveDate>,
}

async fn student_get_or_create<C: ConnectionTrait>(
    db: &C,
    seed: StudentSeed<'_>,
) -> Result<(students::Model, bool)> {
    let code = normalize_student_code(seed.code);
    let existing = students::Entity::find()
        .filter(students::Column::StudentId.eq(code.as_str()))
        .one(db)
        .await
        .map_err(db_err("Failed to query student"))?;
    if let Some(student) = existing {
        return Ok((student, false));
    }

    let now = now_ts();
    let created = students::ActiveModel {
        student_id: Set(code),
        first_name: Set(seed.first_name.trim().to_string()),
        last_name: Set(seed.last_name.trim().to_string()),
        date_of_birth: Set(seed.date_of_birth),
        admission_date: Set(seed.admission_date),
        grade: Set(seed.grade.trim().to_string()),
        status: Set(StudentStatus::Active.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to create student"))?;
    Ok((created, true))
}

/// Links a guardian; `false` when the link already existed.
async fn link_guardian<C: ConnectionTrait>(db: &C, student_id: i64, user_id: i64) -> Result<bool> {
    let existing = student_guardians::Entity::find()
        .filter(student_guardians::Column::StudentId.eq(student_id))
        .filter(student_guardians::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(db_err("Failed to query guardian link"))?;
    if existing.is_some() {
        return Ok(false);
    }

    student_guardians::ActiveModel {
        student_id: Set(student_id),
        user_id: Set(user_id),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to link guardian"))?;
    Ok(true)
}

async fn resolve_year<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<academic_years::Model>> {
    let name = name.trim();
    if !name.is_empty() {
        let by_name = academic_years::Entity::find()
            .filter(academic_years::Column::Name.eq(name))
            .one(db)
            .await
            .map_err(db_err("Failed to query academic year"))?;
        if by_name.is_some() {
            return Ok(by_name);
        }
    }

    academic_years::Entity::find()
        .filter(academic_years::Column::IsCurrent.eq(true))
        .order_by_desc(academic_years::Column::StartDate)
        .one(db)
        .await
        .map_err(db_err("Failed to query current academic year"))
}

async fn class_group_get_or_create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    grade_level: &str,
    year_id: i64,
) -> Result<class_groups::Model> {
    let existing = class_groups::Entity::find()
        .filter(class_groups::Column::Name.eq(name))
        .filter(class_groups::Column::AcademicYearId.eq(year_id))
        .one(db)
        .await
        .map_err(db_err("Failed to query class group"))?;
    if let Some(group) = existing {
        return Ok(group);
    }

    class_groups::ActiveModel {
        name: Set(name.to_string()),
        grade_level: Set(grade_level.trim().to_string()),
        academic_year_id: Set(year_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to create class group"))
}

impl SeaOrmStorage {
    pub async fn list_applications_impl(
        &self,
        search: Option<String>,
        status: Option<ApplicationStatus>,
        limit: u64,
    ) -> Result<Vec<AdmissionApplication>> {
        let mut select = admission_applications::Entity::find();
        if let Some(status) = status {
            select = select.filter(admission_applications::Column::Status.eq(status.as_str()));
        }
        if let Some(term) = search_term(search.as_deref()) {
            select = select.filter(
                Condition::any()
                    .add(admission_applications::Column::FirstName.contains(&term))
                    .add(admission_applications::Column::LastName.contains(&term))
                    .add(admission_applications::Column::GuardianName.contains(&term))
                    .add(admission_applications::Column::GuardianEmail.contains(&term)),
            );
        }

        let rows = select
            .order_by_desc(admission_applications::Column::CreatedAt)
            .order_by_desc(admission_applications::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list applications"))?;

        Ok(rows.into_iter().map(|m| m.into_application()).collect())
    }

    pub async fn get_application_impl(&self, id: i64) -> Result<Option<AdmissionApplication>> {
        let row = admission_applications::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query application"))?;

        Ok(row.map(|m| m.into_application()))
    }

    pub async fn create_application_impl(
        &self,
        req: CreateApplicationRequest,
    ) -> Result<AdmissionApplication> {
        let now = now_ts();
        let created = admission_applications::ActiveModel {
            status: Set(ApplicationStatus::New.to_string()),
            first_name: Set(req.first_name.trim().to_string()),
            last_name: Set(req.last_name.trim().to_string()),
            date_of_birth: Set(req.date_of_birth),
            requested_grade: Set(req.requested_grade.trim().to_string()),
            guardian_name: Set(req.guardian_name.trim().to_string()),
            guardian_phone: Set(req.guardian_phone.trim().to_string()),
            guardian_email: Set(req.guardian_email.trim().to_string()),
            guardian_relationship: Set(req.guardian_relationship.trim().to_string()),
            notes: Set(req.notes.trim().to_string()),
            admitted_student_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create application"))?;

        Ok(created.into_application())
    }

    pub async fn update_application_status_impl(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<AdmissionApplication>> {
        let Some(app) = admission_applications::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query application"))?
        else {
            return Ok(None);
        };

        let mut model: admission_applications::ActiveModel = app.into();
        model.status = Set(status.to_string());
        model.updated_at = Set(now_ts());
        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to update application"))?;

        Ok(Some(updated.into_application()))
    }

    pub async fn admit_application_impl(&self, plan: AdmitPlan) -> Result<AdmitOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let app = admission_applications::Entity::find_by_id(plan.application_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query application"))?
            .ok_or_else(|| BusyBeeError::not_found("Application not found"))?;
        let group = class_groups::Entity::find_by_id(plan.class_group_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query class group"))?
            .ok_or_else(|| BusyBeeError::not_found("Class group not found"))?;

        let (student, student_created) = student_get_or_create(
            &txn,
            StudentSeed {
                code: &plan.student_code,
                first_name: &plan.first_name,
                last_name: &plan.last_name,
                date_of_birth: plan.date_of_birth,
                grade: &plan.grade,
                admission_date: Some(plan.admission_date),
            },
        )
        .await?;

        let (_, enrollment) = academics::upsert_enrollment(&txn, student.id, &group).await?;

        if let Some(parent_id) = plan.parent_id {
            link_guardian(&txn, student.id, parent_id).await?;
        }

        let mut model: admission_applications::ActiveModel = app.into();
        model.status = Set(ApplicationStatus::Accepted.to_string());
        model.admitted_student_id = Set(Some(student.student_id.clone()));
        model.updated_at = Set(now_ts());
        let application = model
            .update(&txn)
            .await
            .map_err(db_err("Failed to update application"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit admission"))?;

        Ok(AdmitOutcome {
            application: application.into_application(),
            student_id: student.id,
            student_created,
            enrollment,
        })
    }

    pub async fn import_admission_row_impl(
        &self,
        row: AdmissionRow,
        parent: ParentSpec,
    ) -> Result<AdmissionRowOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;
        let mut outcome = AdmissionRowOutcome::default();

        let (student, created) = student_get_or_create(
            &txn,
            StudentSeed {
                code: &row.student_code,
                first_name: &row.first_name,
                last_name: &row.last_name,
                date_of_birth: row.date_of_birth,
                grade: &row.grade,
                admission_date: None,
            },
        )
        .await?;
        outcome.student_created = created;

        let class_name = row.class_group.trim();
        if !class_name.is_empty() {
            let year = resolve_year(&txn, &row.academic_year).await?.ok_or_else(|| {
                BusyBeeError::validation("No matching academic year and no current year is set")
            })?;
            let group = class_group_get_or_create(&txn, class_name, &row.grade, year.id).await?;
            let (_, enrollment) = academics::upsert_enrollment(&txn, student.id, &group).await?;
            outcome.enrollment = Some(enrollment);
        }

        let parent_id = match parent {
            ParentSpec::None => None,
            ParentSpec::Existing(id) => Some(id),
            ParentSpec::Create {
                username,
                email,
                password_hash,
            } => {
                let now = now_ts();
                let user = users::ActiveModel {
                    username: Set(username),
                    email: Set(email),
                    password_hash: Set(password_hash),
                    role: Set(UserRole::Parent.to_string()),
                    status: Set(UserStatus::Active.to_string()),
                    first_name: Set(String::new()),
                    last_name: Set(String::new()),
                    phone: Set(None),
                    preferred_language: Set(PreferredLanguage::English.to_string()),
                    staff_code: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(write_err("Failed to create parent account"))?;
                outcome.parent_created = true;
                Some(user.id)
            }
        };
        if let Some(parent_id) = parent_id {
            outcome.parent_linked = link_guardian(&txn, student.id, parent_id).await?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit admission row"))?;

        Ok(outcome)
    }

    pub async fn application_counts_impl(&self) -> Result<ApplicationCounts> {
        let statuses: Vec<String> = admission_applications::Entity::find()
            .select_only()
            .column(admission_applications::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to count applications"))?;

        let mut counts = ApplicationCounts::default();
        for status in statuses {
            counts.add(status.parse().unwrap_or(ApplicationStatus::New));
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::academics::entities::EnrollmentOutcome;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::academics::tests::{d, year};
    use crate::storage::sea_orm_storage::users::tests::new_user;

    fn application(first: &str, last: &str) -> CreateApplicationRequest {
        CreateApplicationRequest {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: Some(d(2018, 6, 1)),
            requested_grade: "Grade 1".to_string(),
            guardian_name: "Grace Sibanda".to_string(),
            guardian_phone: String::new(),
            guardian_email: "grace@example.com".to_string(),
            guardian_relationship: "Mother".to_string(),
            notes: String::new(),
        }
    }

    fn admission_row(code: &str, class: &str, year: &str) -> AdmissionRow {
        AdmissionRow {
            row: 2,
            student_code: code.to_string(),
            first_name: "Kuda".to_string(),
            last_name: "Sibanda".to_string(),
            date_of_birth: d(2017, 2, 3),
            grade: "Grade 2".to_string(),
            class_group: class.to_string(),
            academic_year: year.to_string(),
            parent_username: String::new(),
            parent_email: String::new(),
        }
    }

    #[tokio::test]
    async fn test_application_listing_and_counts() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let first = storage.create_application(application("Tariro", "Sibanda")).await.unwrap();
        storage.create_application(application("Farai", "Ncube")).await.unwrap();
        assert_eq!(first.status, ApplicationStatus::New);

        storage
            .update_application_status(first.id, ApplicationStatus::Reviewed)
            .await
            .unwrap();
        let reviewed = storage
            .list_applications(None, Some(ApplicationStatus::Reviewed), 250)
            .await
            .unwrap();
        assert_eq!(reviewed.len(), 1);

        let found = storage
            .list_applications(Some("ncube".to_string()), None, 250)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Farai");

        let counts = storage.application_counts().await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.new, 1);
        assert_eq!(counts.reviewed, 1);
        assert!(
            storage
                .update_application_status(404, ApplicationStatus::Rejected)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_admit_creates_student_enrollment_and_link() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let year_id = year(&storage, "2025", true).await;
        let group = storage.create_class_group("1A", "Grade 1", year_id).await.unwrap();
        let parent = storage.create_user(new_user("grace", UserRole::Parent)).await.unwrap();
        let app = storage.create_application(application("Tariro", "Sibanda")).await.unwrap();

        let outcome = storage
            .admit_application(AdmitPlan {
                application_id: app.id,
                student_code: "bb100".to_string(),
                first_name: app.first_name.clone(),
                last_name: app.last_name.clone(),
                date_of_birth: d(2018, 6, 1),
                grade: app.requested_grade.clone(),
                admission_date: d(2025, 1, 14),
                class_group_id: group.class_group.id,
                parent_id: Some(parent.id),
            })
            .await
            .unwrap();

        assert!(outcome.student_created);
        assert_eq!(outcome.enrollment, EnrollmentOutcome::Created);
        assert_eq!(outcome.application.status, ApplicationStatus::Accepted);
        assert_eq!(outcome.application.admitted_student_id.as_deref(), Some("BB100"));
        assert!(storage.is_guardian(parent.id, outcome.student_id).await.unwrap());
        assert_eq!(storage.list_roster(group.class_group.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_row_is_idempotent() {
        let storage = SeaOrmStorage::new_in_memory().await;
        year(&storage, "2025", true).await;

        let first = storage
            .import_admission_row(
                admission_row("BB200", "2B", ""),
                ParentSpec::Create {
                    username: "kparent".to_string(),
                    email: "kparent@example.com".to_string(),
                    password_hash: "hash".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(first.student_created);
        assert_eq!(first.enrollment, Some(EnrollmentOutcome::Created));
        assert!(first.parent_created);
        assert!(first.parent_linked);

        let parent = storage.get_user_by_username("kparent").await.unwrap().unwrap();
        let again = storage
            .import_admission_row(admission_row("bb200", "2B", "2025"), ParentSpec::Existing(parent.id))
            .await
            .unwrap();
        assert!(!again.student_created);
        assert_eq!(again.enrollment, Some(EnrollmentOutcome::Unchanged));
        assert!(!again.parent_linked);

        let moved = storage
            .import_admission_row(admission_row("BB200", "2C", "2025"), ParentSpec::None)
            .await
            .unwrap();
        assert_eq!(moved.enrollment, Some(EnrollmentOutcome::Moved));
    }

    #[tokio::test]
    async fn test_bulk_row_without_year_fails_cleanly() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let res = storage
            .import_admission_row(admission_row("BB300", "3A", "1999"), ParentSpec::None)
            .await;
        assert!(matches!(res, Err(BusyBeeError::Validation(_))));
        // The transaction rolled back the student insert.
        assert!(storage.get_student_by_code("BB300").await.unwrap().is_none());

        let no_class = storage
            .import_admission_row(admission_row("BB301", "", ""), ParentSpec::None)
            .await
            .unwrap();
        assert!(no_class.student_created);
        assert_eq!(no_class.enrollment, None);
    }
}
