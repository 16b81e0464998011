//! Monthly report PDF: the month's performance notes and behaviour records,
//! followed by a page of suggestions for parents.

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{NaiveDate, Utc};

use super::ReportsService;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::{
    ErrorCode,
    people::entities::Student,
    reports::{
        requests::MonthlyQuery,
        responses::{MonthlyReport, NoteLine},
    },
};
use crate::services::access::{
    ACCESS_DENIED, bad_request, can_see_student_records, forbidden, not_found,
};
use crate::storage::Storage;
use crate::utils::dates::{first_of_month, last_of_month, parse_month, today};
use crate::utils::pdf::PdfWriter;

const SUGGESTIONS: &[&str] = &[
    "1) Review performance notes with your child weekly.",
    "2) Encourage consistent homework routines and attendance.",
    "3) Contact the teacher through BusyBee messages if anything is unclear.",
];

/// Display names of note authors, looked up once per teacher.
async fn teacher_names(
    storage: &dyn Storage,
    ids: impl Iterator<Item = i64>,
) -> Result<HashMap<i64, String>> {
    let mut names = HashMap::new();
    for id in ids {
        if names.contains_key(&id) {
            continue;
        }
        let name = storage
            .get_user_by_id(id)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_else(|| "Teacher".to_string());
        names.insert(id, name);
    }
    Ok(names)
}

async fn build_monthly(
    storage: &dyn Storage,
    student: Student,
    month: NaiveDate,
) -> Result<MonthlyReport> {
    let mut notes = storage.list_performance_notes(student.id, Some(month)).await?;
    let mut records = storage
        .list_behaviour_records(student.id, Some((month, last_of_month(month))))
        .await?;
    // Printed oldest first.
    notes.reverse();
    records.reverse();

    let names = teacher_names(
        storage,
        notes
            .iter()
            .map(|n| n.teacher_id)
            .chain(records.iter().map(|r| r.teacher_id)),
    )
    .await?;
    let name_of = |id: i64| names.get(&id).cloned().unwrap_or_default();

    Ok(MonthlyReport {
        month,
        performance_notes: notes
            .into_iter()
            .map(|n| NoteLine {
                date: None,
                teacher_name: name_of(n.teacher_id),
                text: n.summary,
            })
            .collect(),
        behaviour_records: records
            .into_iter()
            .map(|r| NoteLine {
                date: Some(r.occurred_on),
                teacher_name: name_of(r.teacher_id),
                text: r.note,
            })
            .collect(),
        student,
    })
}

pub(crate) fn render_monthly_report(report: &MonthlyReport) -> Result<Vec<u8>> {
    let student = &report.student;
    let mut pdf = PdfWriter::new("Monthly Student Report")?;
    pdf.title("BusyBee Connect - Monthly Student Report");
    pdf.line(&format!("Student: {} ({})", student.full_name(), student.student_id));
    pdf.line(&format!("Grade: {}", student.grade));
    pdf.line(&format!("Month: {}", report.month.format("%B %Y")));
    pdf.line(&format!("Generated: {}", Utc::now().format("%Y-%m-%d %H:%M")));

    pdf.heading("Performance Summary");
    if report.performance_notes.is_empty() {
        pdf.line("- No performance notes recorded for this month.");
    }
    for note in &report.performance_notes {
        pdf.paragraph(&format!("- ({}) {}", note.teacher_name, note.text));
        pdf.gap(2.0);
    }

    pdf.heading("Behaviour Notes");
    if report.behaviour_records.is_empty() {
        pdf.line("- No behaviour records recorded for this month.");
    }
    for record in &report.behaviour_records {
        let date = record.date.map(|d| d.to_string()).unwrap_or_default();
        pdf.paragraph(&format!("- ({}, {}) {}", date, record.teacher_name, record.text));
        pdf.gap(2.0);
    }

    pdf.new_page();
    pdf.title("Suggestions for Parents");
    for line in SUGGESTIONS {
        pdf.line(line);
    }

    pdf.finish()
}

pub async fn monthly_report_pdf(
    service: &ReportsService,
    student_id: i64,
    query: MonthlyQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let month = match query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(raw) => match parse_month(raw) {
            Some(month) => month,
            None => {
                return Ok(bad_request(
                    ErrorCode::BadRequest,
                    "Invalid month. Use YYYY-MM.",
                ));
            }
        },
        None => first_of_month(today()),
    };

    let Some(student) = storage.get_student_by_id(student_id).await? else {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    };
    if !can_see_student_records(storage.as_ref(), &user, student.id).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    let report = build_monthly(storage.as_ref(), student, month).await?;
    let bytes = render_monthly_report(&report)?;
    let filename = format!(
        "monthly_{}_{}.pdf",
        report.student.student_id,
        month.format("%Y-%m")
    );

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::people::requests::CreateStudentRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_monthly_report_filters_month() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let teacher = storage
            .create_user(new_user("mrsb", UserRole::Teacher))
            .await
            .unwrap();
        let student = storage
            .create_student(CreateStudentRequest {
                student_id: "BB-7".to_string(),
                first_name: "Rudo".to_string(),
                last_name: "Ncube".to_string(),
                date_of_birth: d(2015, 6, 1),
                admission_date: None,
                grade: "Grade 4".to_string(),
                status: None,
            })
            .await
            .unwrap();

        storage
            .create_performance_note(student.id, teacher.id, d(2025, 3, 1), "Reading improved.")
            .await
            .unwrap();
        storage
            .create_performance_note(student.id, teacher.id, d(2025, 2, 1), "February note.")
            .await
            .unwrap();
        storage
            .create_behaviour_record(student.id, teacher.id, d(2025, 3, 3), "Helped a classmate.")
            .await
            .unwrap();
        storage
            .create_behaviour_record(student.id, teacher.id, d(2025, 4, 1), "April.")
            .await
            .unwrap();

        let report = build_monthly(&storage, student, d(2025, 3, 1)).await.unwrap();
        assert_eq!(report.performance_notes.len(), 1);
        assert_eq!(report.performance_notes[0].text, "Reading improved.");
        assert_eq!(report.behaviour_records.len(), 1);
        assert_eq!(report.behaviour_records[0].date, Some(d(2025, 3, 3)));
        assert_eq!(report.behaviour_records[0].teacher_name, teacher.full_name());

        let bytes = render_monthly_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
