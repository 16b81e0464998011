use std::collections::HashMap;

use chrono::NaiveDate;

use super::{SeaOrmStorage, db_err, joins, now_ts, write_err};
use crate::entity::{
    academic_years, assessments, attendance_records, class_groups, enrollments, grades, subjects,
    timetable_entries,
};
use crate::errors::{BusyBeeError, Result};
use crate::models::academics::{
    entities::{
        AssessmentDetail, AssessmentType, AttendanceCounts, AttendanceRow, AttendanceStatus,
        ClassGroupDetail, EnrollmentDetail, EnrollmentOutcome, Grade, GradeRow, RosterEntry,
        Subject, TimetableEntryDetail, day_name, percentage,
    },
    requests::{AttendanceMark, GradeUpsert, NewAssessment, NewTimetableEntry, TimetableFilter},
};
use crate::storage::DateRange;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Places a student in `group` for the group's academic year, moving an
/// existing enrollment for that year when the class differs.
pub(super) async fn upsert_enrollment<C: ConnectionTrait>(
    db: &C,
    student_id: i64,
    group: &class_groups::Model,
) -> Result<(enrollments::Model, EnrollmentOutcome)> {
    let existing = enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student_id))
        .filter(enrollments::Column::AcademicYearId.eq(group.academic_year_id))
        .one(db)
        .await
        .map_err(db_err("Failed to query enrollment"))?;

    match existing {
        Some(current) if current.class_group_id == group.id => {
            Ok((current, EnrollmentOutcome::Unchanged))
        }
        Some(current) => {
            let mut model: enrollments::ActiveModel = current.into();
            model.class_group_id = Set(group.id);
            let moved = model
                .update(db)
                .await
                .map_err(db_err("Failed to move enrollment"))?;
            Ok((moved, EnrollmentOutcome::Moved))
        }
        None => {
            let created = enrollments::ActiveModel {
                student_id: Set(student_id),
                class_group_id: Set(group.id),
                academic_year_id: Set(group.academic_year_id),
                created_at: Set(now_ts()),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(write_err("Failed to create enrollment"))?;
            Ok((created, EnrollmentOutcome::Created))
        }
    }
}

async fn timetable_details<C: ConnectionTrait>(
    db: &C,
    rows: Vec<timetable_entries::Model>,
) -> Result<Vec<TimetableEntryDetail>> {
    let groups = joins::class_groups_by_ids(db, rows.iter().map(|r| r.class_group_id)).await?;
    let subjects = joins::subjects_by_ids(db, rows.iter().map(|r| r.subject_id)).await?;
    let teachers = joins::users_by_ids(db, rows.iter().filter_map(|r| r.teacher_id)).await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let subject = subjects.get(&r.subject_id);
            TimetableEntryDetail {
                day_name: day_name(r.day_of_week).unwrap_or_default().to_string(),
                class_group_name: groups
                    .get(&r.class_group_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_default(),
                subject_code: subject.map(|s| s.code.clone()).unwrap_or_default(),
                subject_name: subject.map(|s| s.name.clone()).unwrap_or_default(),
                teacher_name: r
                    .teacher_id
                    .and_then(|id| teachers.get(&id))
                    .map(|u| u.display_name()),
                entry: r.into_entry(),
            }
        })
        .collect())
}

async fn attendance_rows<C: ConnectionTrait>(
    db: &C,
    rows: Vec<attendance_records::Model>,
) -> Result<Vec<AttendanceRow>> {
    let students = joins::students_by_ids(db, rows.iter().map(|r| r.student_id)).await?;
    let groups = joins::class_groups_by_ids(db, rows.iter().map(|r| r.class_group_id)).await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let student = students.get(&r.student_id);
            AttendanceRow {
                id: r.id,
                date: r.date,
                status: r.attendance_status(),
                student_id: r.student_id,
                student_code: student.map(|s| s.student_id.clone()).unwrap_or_default(),
                student_name: student.map(|s| s.full_name()).unwrap_or_default(),
                class_group_name: groups
                    .get(&r.class_group_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_default(),
            }
        })
        .collect())
}

async fn assessment_details<C: ConnectionTrait>(
    db: &C,
    rows: Vec<assessments::Model>,
) -> Result<Vec<AssessmentDetail>> {
    let groups = joins::class_groups_by_ids(db, rows.iter().map(|r| r.class_group_id)).await?;
    let subjects = joins::subjects_by_ids(db, rows.iter().map(|r| r.subject_id)).await?;

    Ok(rows
        .into_iter()
        .map(|r| AssessmentDetail {
            class_group_name: groups
                .get(&r.class_group_id)
                .map(|g| g.name.clone())
                .unwrap_or_default(),
            subject_name: subjects
                .get(&r.subject_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            assessment: r.into_assessment(),
        })
        .collect())
}

impl SeaOrmStorage {
    pub async fn list_subjects_impl(&self) -> Result<Vec<Subject>> {
        let rows = subjects::Entity::find()
            .order_by_asc(subjects::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list subjects"))?;

        Ok(rows.into_iter().map(|m| m.into_subject()).collect())
    }

    pub async fn get_subject_impl(&self, id: i64) -> Result<Option<Subject>> {
        let row = subjects::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query subject"))?;

        Ok(row.map(|m| m.into_subject()))
    }

    pub async fn create_subject_impl(&self, code: &str, name: &str) -> Result<Subject> {
        let created = subjects::ActiveModel {
            code: Set(code.trim().to_string()),
            name: Set(name.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create subject"))?;

        Ok(created.into_subject())
    }

    pub async fn count_subjects_impl(&self) -> Result<u64> {
        subjects::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count subjects"))
    }

    pub async fn list_class_groups_impl(
        &self,
        academic_year_id: Option<i64>,
    ) -> Result<Vec<ClassGroupDetail>> {
        let mut select = class_groups::Entity::find();
        if let Some(year_id) = academic_year_id {
            select = select.filter(class_groups::Column::AcademicYearId.eq(year_id));
        }
        let rows = select
            .order_by_asc(class_groups::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list class groups"))?;

        joins::class_group_details(&self.db, rows).await
    }

    pub async fn get_class_group_impl(&self, id: i64) -> Result<Option<ClassGroupDetail>> {
        let Some(row) = class_groups::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query class group"))?
        else {
            return Ok(None);
        };

        Ok(joins::class_group_details(&self.db, vec![row]).await?.pop())
    }

    pub async fn create_class_group_impl(
        &self,
        name: &str,
        grade_level: &str,
        academic_year_id: i64,
    ) -> Result<ClassGroupDetail> {
        let created = class_groups::ActiveModel {
            name: Set(name.trim().to_string()),
            grade_level: Set(grade_level.trim().to_string()),
            academic_year_id: Set(academic_year_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create class group"))?;

        joins::class_group_details(&self.db, vec![created])
            .await?
            .pop()
            .ok_or_else(|| BusyBeeError::database_operation("Created class group vanished"))
    }

    pub async fn list_roster_impl(&self, class_group_id: i64) -> Result<Vec<RosterEntry>> {
        let student_ids: Vec<i64> = enrollments::Entity::find()
            .select_only()
            .column(enrollments::Column::StudentId)
            .filter(enrollments::Column::ClassGroupId.eq(class_group_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load roster"))?;

        let students = joins::students_by_ids(&self.db, student_ids).await?;
        let mut roster: Vec<RosterEntry> = students
            .into_values()
            .map(|s| RosterEntry {
                student_id: s.id,
                student_code: s.student_id,
                first_name: s.first_name,
                last_name: s.last_name,
            })
            .collect();
        roster.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });

        Ok(roster)
    }

    pub async fn enroll_student_impl(
        &self,
        student_id: i64,
        class_group_id: i64,
    ) -> Result<(EnrollmentDetail, EnrollmentOutcome)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let group = class_groups::Entity::find_by_id(class_group_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query class group"))?
            .ok_or_else(|| BusyBeeError::not_found("Class group not found"))?;

        let (enrollment, outcome) = upsert_enrollment(&txn, student_id, &group).await?;
        let detail = joins::enrollment_details(&txn, vec![enrollment])
            .await?
            .pop()
            .ok_or_else(|| BusyBeeError::database_operation("Enrollment vanished"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit enrollment"))?;

        Ok((detail, outcome))
    }

    pub async fn delete_enrollment_impl(&self, id: i64) -> Result<bool> {
        let result = enrollments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete enrollment"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn get_current_enrollment_impl(
        &self,
        student_id: i64,
    ) -> Result<Option<EnrollmentDetail>> {
        Ok(self
            .current_enrollments_impl(&[student_id])
            .await?
            .remove(&student_id))
    }

    pub async fn current_enrollments_impl(
        &self,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, EnrollmentDetail>> {
        if student_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.is_in(student_ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load enrollments"))?;
        let years = joins::years_by_ids(&self.db, rows.iter().map(|e| e.academic_year_id)).await?;

        // Current year wins, then the most recent year.
        let rank = |e: &enrollments::Model| {
            let year: Option<&academic_years::Model> = years.get(&e.academic_year_id);
            (
                year.is_some_and(|y| y.is_current),
                year.map(|y| y.start_date),
                e.id,
            )
        };
        let mut best: HashMap<i64, enrollments::Model> = HashMap::new();
        for row in rows {
            let replace = best
                .get(&row.student_id)
                .is_none_or(|current| rank(current) < rank(&row));
            if replace {
                best.insert(row.student_id, row);
            }
        }

        let details = joins::enrollment_details(&self.db, best.into_values().collect()).await?;
        Ok(details.into_iter().map(|d| (d.student_id, d)).collect())
    }

    pub async fn create_timetable_entry_impl(
        &self,
        entry: NewTimetableEntry,
    ) -> Result<TimetableEntryDetail> {
        let created = timetable_entries::ActiveModel {
            class_group_id: Set(entry.class_group_id),
            subject_id: Set(entry.subject_id),
            teacher_id: Set(entry.teacher_id),
            day_of_week: Set(entry.day_of_week),
            start_time: Set(entry.start_time),
            end_time: Set(entry.end_time),
            room: Set(entry.room.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create timetable entry"))?;

        timetable_details(&self.db, vec![created])
            .await?
            .pop()
            .ok_or_else(|| BusyBeeError::database_operation("Timetable entry vanished"))
    }

    pub async fn delete_timetable_entry_impl(&self, id: i64) -> Result<bool> {
        let result = timetable_entries::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete timetable entry"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_timetable_impl(
        &self,
        filter: TimetableFilter,
    ) -> Result<Vec<TimetableEntryDetail>> {
        let mut select = timetable_entries::Entity::find();
        if let Some(teacher_id) = filter.teacher_id {
            select = select.filter(timetable_entries::Column::TeacherId.eq(teacher_id));
        }
        if let Some(class_group_id) = filter.class_group_id {
            select = select.filter(timetable_entries::Column::ClassGroupId.eq(class_group_id));
        }
        if let Some(day) = filter.day_of_week {
            select = select.filter(timetable_entries::Column::DayOfWeek.eq(day));
        }

        let rows = select
            .order_by_asc(timetable_entries::Column::DayOfWeek)
            .order_by_asc(timetable_entries::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list timetable"))?;

        timetable_details(&self.db, rows).await
    }

    pub async fn teacher_class_groups_impl(&self, teacher_id: i64) -> Result<Vec<ClassGroupDetail>> {
        let ids: Vec<i64> = timetable_entries::Entity::find()
            .select_only()
            .column(timetable_entries::Column::ClassGroupId)
            .distinct()
            .filter(timetable_entries::Column::TeacherId.eq(teacher_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load teacher classes"))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = class_groups::Entity::find()
            .filter(class_groups::Column::Id.is_in(ids))
            .order_by_asc(class_groups::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load teacher classes"))?;

        joins::class_group_details(&self.db, rows).await
    }

    pub async fn teacher_teaches_class_impl(
        &self,
        teacher_id: i64,
        class_group_id: i64,
    ) -> Result<bool> {
        let count = timetable_entries::Entity::find()
            .filter(timetable_entries::Column::TeacherId.eq(teacher_id))
            .filter(timetable_entries::Column::ClassGroupId.eq(class_group_id))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to check class assignment"))?;

        Ok(count > 0)
    }

    pub async fn attendance_for_class_date_impl(
        &self,
        class_group_id: i64,
        date: NaiveDate,
    ) -> Result<HashMap<i64, AttendanceStatus>> {
        let rows = attendance_records::Entity::find()
            .filter(attendance_records::Column::ClassGroupId.eq(class_group_id))
            .filter(attendance_records::Column::Date.eq(date))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load attendance"))?;

        Ok(rows
            .into_iter()
            .map(|r| (r.student_id, r.attendance_status()))
            .collect())
    }

    pub async fn mark_attendance_impl(
        &self,
        class_group_id: i64,
        date: NaiveDate,
        marks: Vec<AttendanceMark>,
        recorded_by: i64,
    ) -> Result<usize> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let existing: HashMap<i64, attendance_records::Model> = attendance_records::Entity::find()
            .filter(attendance_records::Column::ClassGroupId.eq(class_group_id))
            .filter(attendance_records::Column::Date.eq(date))
            .all(&txn)
            .await
            .map_err(db_err("Failed to load attendance"))?
            .into_iter()
            .map(|r| (r.student_id, r))
            .collect();

        let now = now_ts();
        let mut written = 0;
        for mark in marks {
            match existing.get(&mark.student_id) {
                Some(record) => {
                    let mut model: attendance_records::ActiveModel = record.clone().into();
                    model.status = Set(mark.status.to_string());
                    model.recorded_by = Set(Some(recorded_by));
                    model
                        .update(&txn)
                        .await
                        .map_err(db_err("Failed to update attendance"))?;
                }
                None => {
                    attendance_records::ActiveModel {
                        student_id: Set(mark.student_id),
                        class_group_id: Set(class_group_id),
                        date: Set(date),
                        status: Set(mark.status.to_string()),
                        recorded_by: Set(Some(recorded_by)),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(write_err("Failed to record attendance"))?;
                }
            }
            written += 1;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit attendance"))?;

        Ok(written)
    }

    pub async fn list_attendance_impl(
        &self,
        student_ids: &[i64],
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<AttendanceRow>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select = attendance_records::Entity::find()
            .filter(attendance_records::Column::StudentId.is_in(student_ids.to_vec()));
        if let Some((start, end)) = range {
            select = select.filter(attendance_records::Column::Date.between(start, end));
        }
        let rows = select
            .order_by_desc(attendance_records::Column::Date)
            .order_by_desc(attendance_records::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list attendance"))?;

        attendance_rows(&self.db, rows).await
    }

    pub async fn attendance_counts_since_impl(
        &self,
        student_ids: &[i64],
        since: NaiveDate,
    ) -> Result<HashMap<i64, AttendanceCounts>> {
        if student_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = attendance_records::Entity::find()
            .filter(attendance_records::Column::StudentId.is_in(student_ids.to_vec()))
            .filter(attendance_records::Column::Date.gte(since))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to count attendance"))?;

        let mut counts: HashMap<i64, AttendanceCounts> = HashMap::new();
        for row in rows {
            counts
                .entry(row.student_id)
                .or_default()
                .add(row.attendance_status(), row.date);
        }
        Ok(counts)
    }

    pub async fn attendance_summary_since_impl(&self, since: NaiveDate) -> Result<AttendanceCounts> {
        let rows = attendance_records::Entity::find()
            .filter(attendance_records::Column::Date.gte(since))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to summarise attendance"))?;

        let mut counts = AttendanceCounts::default();
        for row in rows {
            counts.add(row.attendance_status(), row.date);
        }
        Ok(counts)
    }

    pub async fn recent_absences_impl(
        &self,
        since: NaiveDate,
        limit: u64,
    ) -> Result<Vec<AttendanceRow>> {
        let rows = attendance_records::Entity::find()
            .filter(attendance_records::Column::Date.gte(since))
            .filter(attendance_records::Column::Status.eq(AttendanceStatus::Absent.as_str()))
            .order_by_desc(attendance_records::Column::Date)
            .order_by_desc(attendance_records::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list absences"))?;

        attendance_rows(&self.db, rows).await
    }

    pub async fn list_teacher_assessments_impl(
        &self,
        teacher_id: i64,
        search: Option<String>,
        limit: u64,
    ) -> Result<Vec<AssessmentDetail>> {
        let rows = assessments::Entity::find()
            .filter(assessments::Column::TeacherId.eq(teacher_id))
            .order_by_desc(assessments::Column::Date)
            .order_by_desc(assessments::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list assessments"))?;

        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let details = assessment_details(&self.db, rows).await?;

        Ok(details
            .into_iter()
            .filter(|d| match &needle {
                Some(n) => {
                    d.assessment.title.to_lowercase().contains(n)
                        || d.subject_name.to_lowercase().contains(n)
                        || d.class_group_name.to_lowercase().contains(n)
                }
                None => true,
            })
            .take(limit as usize)
            .collect())
    }

    pub async fn get_assessment_impl(&self, id: i64) -> Result<Option<AssessmentDetail>> {
        let Some(row) = assessments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query assessment"))?
        else {
            return Ok(None);
        };

        Ok(assessment_details(&self.db, vec![row]).await?.pop())
    }

    pub async fn create_assessment_impl(&self, assessment: NewAssessment) -> Result<AssessmentDetail> {
        let created = assessments::ActiveModel {
            class_group_id: Set(assessment.class_group_id),
            subject_id: Set(assessment.subject_id),
            teacher_id: Set(assessment.teacher_id),
            title: Set(assessment.title.trim().to_string()),
            assessment_type: Set(assessment.assessment_type.to_string()),
            max_score: Set(assessment.max_score),
            weight: Set(assessment.weight),
            date: Set(assessment.date),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create assessment"))?;

        assessment_details(&self.db, vec![created])
            .await?
            .pop()
            .ok_or_else(|| BusyBeeError::database_operation("Assessment vanished"))
    }

    pub async fn grades_for_assessment_impl(&self, assessment_id: i64) -> Result<HashMap<i64, Grade>> {
        let rows = grades::Entity::find()
            .filter(grades::Column::AssessmentId.eq(assessment_id))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load grades"))?;

        Ok(rows
            .into_iter()
            .map(|g| (g.student_id, g.into_grade()))
            .collect())
    }

    pub async fn upsert_grades_impl(
        &self,
        assessment_id: i64,
        entries: Vec<GradeUpsert>,
    ) -> Result<usize> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let existing: HashMap<i64, grades::Model> = grades::Entity::find()
            .filter(grades::Column::AssessmentId.eq(assessment_id))
            .all(&txn)
            .await
            .map_err(db_err("Failed to load grades"))?
            .into_iter()
            .map(|g| (g.student_id, g))
            .collect();

        let now = now_ts();
        let mut written = 0;
        for entry in entries {
            match existing.get(&entry.student_id) {
                Some(grade) => {
                    let mut model: grades::ActiveModel = grade.clone().into();
                    model.score = Set(entry.score);
                    model.comment = Set(entry.comment);
                    model.updated_at = Set(now);
                    model
                        .update(&txn)
                        .await
                        .map_err(db_err("Failed to update grade"))?;
                }
                None => {
                    grades::ActiveModel {
                        assessment_id: Set(assessment_id),
                        student_id: Set(entry.student_id),
                        score: Set(entry.score),
                        comment: Set(entry.comment),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(write_err("Failed to save grade"))?;
                }
            }
            written += 1;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit grades"))?;

        Ok(written)
    }

    pub async fn list_grades_impl(
        &self,
        student_ids: &[i64],
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<GradeRow>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = grades::Entity::find()
            .filter(grades::Column::StudentId.is_in(student_ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list grades"))?;

        let mut assessment_ids: Vec<i64> = rows.iter().map(|g| g.assessment_id).collect();
        assessment_ids.sort_unstable();
        assessment_ids.dedup();
        let mut select =
            assessments::Entity::find().filter(assessments::Column::Id.is_in(assessment_ids));
        if let Some((start, end)) = range {
            select = select.filter(assessments::Column::Date.between(start, end));
        }
        let by_id: HashMap<i64, assessments::Model> = select
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load assessments"))?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let subjects =
            joins::subjects_by_ids(&self.db, by_id.values().map(|a| a.subject_id)).await?;
        let students = joins::students_by_ids(&self.db, rows.iter().map(|g| g.student_id)).await?;

        let mut out: Vec<GradeRow> = rows
            .into_iter()
            .filter_map(|g| {
                let a = by_id.get(&g.assessment_id)?;
                let student = students.get(&g.student_id);
                Some(GradeRow {
                    id: g.id,
                    student_id: g.student_id,
                    student_code: student.map(|s| s.student_id.clone()).unwrap_or_default(),
                    student_name: student.map(|s| s.full_name()).unwrap_or_default(),
                    assessment_id: a.id,
                    assessment_title: a.title.clone(),
                    assessment_type: a.assessment_type.parse().unwrap_or(AssessmentType::Test),
                    subject_name: subjects
                        .get(&a.subject_id)
                        .map(|s| s.name.clone())
                        .unwrap_or_default(),
                    date: a.date,
                    score: g.score,
                    max_score: a.max_score,
                    percentage: percentage(g.score, a.max_score),
                    comment: g.comment,
                })
            })
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        out.truncate(limit as usize);

        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::system::requests::CreateAcademicYearRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::people::tests::new_student;
    use crate::storage::sea_orm_storage::users::tests::new_user;
    use chrono::NaiveTime;

    pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) async fn year(storage: &SeaOrmStorage, name: &str, current: bool) -> i64 {
        let y: i32 = name.parse().unwrap_or(2025);
        storage
            .create_academic_year(CreateAcademicYearRequest {
                name: name.to_string(),
                start_date: d(y, 1, 10),
                end_date: d(y, 12, 5),
                is_current: current,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_enrollment_created_moved_unchanged() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let y = year(&storage, "2025", true).await;
        let a = storage.create_class_group("4A", "Grade 4", y).await.unwrap();
        let b = storage.create_class_group("4B", "Grade 4", y).await.unwrap();
        let s = storage.create_student(new_student("S1", "Tino", "Moyo")).await.unwrap();

        let (_, outcome) = storage.enroll_student(s.id, a.class_group.id).await.unwrap();
        assert_eq!(outcome, EnrollmentOutcome::Created);
        let (_, outcome) = storage.enroll_student(s.id, a.class_group.id).await.unwrap();
        assert_eq!(outcome, EnrollmentOutcome::Unchanged);
        let (detail, outcome) = storage.enroll_student(s.id, b.class_group.id).await.unwrap();
        assert_eq!(outcome, EnrollmentOutcome::Moved);
        assert_eq!(detail.class_group_name, "4B");
        assert!(detail.is_current_year);

        assert!(storage.list_roster(a.class_group.id).await.unwrap().is_empty());
        assert_eq!(storage.list_roster(b.class_group.id).await.unwrap().len(), 1);

        let missing = storage.enroll_student(s.id, 9999).await;
        assert!(matches!(missing, Err(BusyBeeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_current_enrollment_prefers_current_year() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let old = year(&storage, "2024", false).await;
        let cur = year(&storage, "2025", true).await;
        let old_group = storage.create_class_group("3A", "Grade 3", old).await.unwrap();
        let cur_group = storage.create_class_group("4A", "Grade 4", cur).await.unwrap();
        let s = storage.create_student(new_student("S1", "Tino", "Moyo")).await.unwrap();

        storage.enroll_student(s.id, old_group.class_group.id).await.unwrap();
        let latest = storage.get_current_enrollment(s.id).await.unwrap().unwrap();
        assert_eq!(latest.class_group_name, "3A");

        storage.enroll_student(s.id, cur_group.class_group.id).await.unwrap();
        let current = storage.get_current_enrollment(s.id).await.unwrap().unwrap();
        assert_eq!(current.class_group_name, "4A");
    }

    #[tokio::test]
    async fn test_attendance_upsert_and_counts() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let y = year(&storage, "2025", true).await;
        let group = storage.create_class_group("4A", "Grade 4", y).await.unwrap();
        let gid = group.class_group.id;
        let teacher = storage.create_user(new_user("teach", UserRole::Teacher)).await.unwrap();
        let s1 = storage.create_student(new_student("S1", "A", "One")).await.unwrap();
        let s2 = storage.create_student(new_student("S2", "B", "Two")).await.unwrap();
        let day = d(2025, 3, 3);

        let marks = vec![
            AttendanceMark { student_id: s1.id, status: AttendanceStatus::Absent },
            AttendanceMark { student_id: s2.id, status: AttendanceStatus::Present },
        ];
        assert_eq!(storage.mark_attendance(gid, day, marks, teacher.id).await.unwrap(), 2);

        let again = vec![AttendanceMark { student_id: s1.id, status: AttendanceStatus::Late }];
        storage.mark_attendance(gid, day, again, teacher.id).await.unwrap();

        let sheet = storage.attendance_for_class_date(gid, day).await.unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet[&s1.id], AttendanceStatus::Late);

        let counts = storage
            .attendance_counts_since(&[s1.id, s2.id], d(2025, 3, 1))
            .await
            .unwrap();
        assert_eq!(counts[&s1.id].late, 1);
        assert_eq!(counts[&s1.id].total, 1);
        assert_eq!(counts[&s2.id].last_date, Some(day));

        let summary = storage.attendance_summary_since(d(2025, 1, 1)).await.unwrap();
        assert_eq!(summary.total, 2);
        assert!(storage.recent_absences(d(2025, 1, 1), 5).await.unwrap().is_empty());

        let rows = storage.list_attendance(&[s1.id], None, 60).await.unwrap();
        assert_eq!(rows[0].student_code, "S1");
        assert_eq!(rows[0].class_group_name, "4A");
    }

    #[tokio::test]
    async fn test_timetable_and_teacher_classes() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let y = year(&storage, "2025", true).await;
        let group = storage.create_class_group("5C", "Grade 5", y).await.unwrap();
        let maths = storage.create_subject("MATH", "Mathematics").await.unwrap();
        let teacher = storage.create_user(new_user("teach", UserRole::Teacher)).await.unwrap();

        for (day, hour) in [(0, 9), (0, 8), (2, 10)] {
            storage
                .create_timetable_entry(NewTimetableEntry {
                    class_group_id: group.class_group.id,
                    subject_id: maths.id,
                    teacher_id: Some(teacher.id),
                    day_of_week: day,
                    start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                    end_time: NaiveTime::from_hms_opt(hour, 45, 0).unwrap(),
                    room: "R1".to_string(),
                })
                .await
                .unwrap();
        }

        let monday = storage
            .list_timetable(TimetableFilter {
                teacher_id: Some(teacher.id),
                day_of_week: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(monday.len(), 2);
        assert_eq!(monday[0].entry.start_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(monday[0].day_name, "Monday");
        assert_eq!(monday[0].subject_name, "Mathematics");

        let classes = storage.teacher_class_groups(teacher.id).await.unwrap();
        assert_eq!(classes.len(), 1);
        assert!(storage.teacher_teaches_class(teacher.id, group.class_group.id).await.unwrap());
        assert!(!storage.teacher_teaches_class(teacher.id + 1, group.class_group.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_grades_upsert_and_listing() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let y = year(&storage, "2025", true).await;
        let group = storage.create_class_group("4A", "Grade 4", y).await.unwrap();
        let sci = storage.create_subject("SCI", "Science").await.unwrap();
        let teacher = storage.create_user(new_user("teach", UserRole::Teacher)).await.unwrap();
        let s = storage.create_student(new_student("S1", "Tino", "Moyo")).await.unwrap();

        let assessment = storage
            .create_assessment(NewAssessment {
                class_group_id: group.class_group.id,
                subject_id: sci.id,
                teacher_id: teacher.id,
                title: "Plants quiz".to_string(),
                assessment_type: AssessmentType::Test,
                max_score: 40.0,
                weight: 100.0,
                date: d(2025, 3, 10),
            })
            .await
            .unwrap();
        let aid = assessment.assessment.id;

        let entry = |score: f64| GradeUpsert {
            student_id: s.id,
            score,
            comment: String::new(),
        };
        storage.upsert_grades(aid, vec![entry(30.0)]).await.unwrap();
        storage.upsert_grades(aid, vec![entry(35.0)]).await.unwrap();

        let sheet = storage.grades_for_assessment(aid).await.unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet[&s.id].score, 35.0);

        let rows = storage.list_grades(&[s.id], None, 80).await.unwrap();
        assert_eq!(rows[0].percentage, 87.5);
        assert_eq!(rows[0].subject_name, "Science");

        let outside = storage
            .list_grades(&[s.id], Some((d(2025, 4, 1), d(2025, 4, 30))), 80)
            .await
            .unwrap();
        assert!(outside.is_empty());

        let found = storage
            .list_teacher_assessments(teacher.id, Some("scien".to_string()), 200)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        let none = storage
            .list_teacher_assessments(teacher.id, Some("history".to_string()), 200)
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
