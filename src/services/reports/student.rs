//! Per-student report over a date range, as JSON or as a printable PDF.

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;

use super::ReportsService;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::entities::AttendanceCounts,
    finance::entities::{InvoiceRow, Payment},
    people::entities::Student,
    reports::{
        requests::ReportQuery,
        responses::{ReportAttendance, ReportFees, StudentReport},
    },
};
use crate::services::access::{
    ACCESS_DENIED, bad_request, can_see_student_records, forbidden, not_found,
};
use crate::storage::Storage;
use crate::utils::Money;
use crate::utils::dates::{first_of_month, today};
use crate::utils::pdf::PdfWriter;

const ATTENDANCE_ROWS: usize = 200;
const GRADE_ROWS: u64 = 200;
const FEE_ROWS: usize = 50;
const PDF_GRADE_ROWS: usize = 15;
/// Upper bound on rows scanned for range counts and fee totals.
const SCAN_LIMIT: u64 = 10_000;

/// Resolves the report window. `Err` carries the message for the client.
pub(crate) fn report_range(
    query: &ReportQuery,
    today: NaiveDate,
) -> std::result::Result<(NaiveDate, NaiveDate), &'static str> {
    let start = query.start_date.unwrap_or_else(|| first_of_month(today));
    let end = query.end_date.unwrap_or(today);
    if start > end {
        return Err("End date must be after start date.");
    }
    Ok((start, end))
}

/// Fee totals cover every invoice of the student; the listing is capped.
fn fee_summary(mut invoices: Vec<InvoiceRow>, payments: Vec<Payment>) -> ReportFees {
    let total_invoiced: Money = invoices.iter().map(|i| i.invoice.total_amount).sum();
    let total_paid: Money = invoices.iter().map(|i| i.paid).sum();
    invoices.truncate(FEE_ROWS);
    ReportFees {
        invoices,
        payments,
        total_invoiced,
        total_paid,
        balance: (total_invoiced - total_paid).non_negative(),
    }
}

async fn build_report(
    storage: &dyn Storage,
    student: Student,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<StudentReport> {
    let ids = [student.id];
    let range = Some((start, end));

    let mut records = storage.list_attendance(&ids, range, SCAN_LIMIT).await?;
    let mut counts = AttendanceCounts::default();
    for record in &records {
        counts.add(record.status, record.date);
    }
    records.truncate(ATTENDANCE_ROWS);

    let grades = storage.list_grades(&ids, range, GRADE_ROWS).await?;
    let invoices = storage.list_invoices(Some(&ids), None, SCAN_LIMIT).await?;
    let payments = storage
        .list_student_payments(student.id, None, FEE_ROWS as u64)
        .await?;
    let enrollment = storage.get_current_enrollment(student.id).await?;

    Ok(StudentReport {
        student,
        start_date: start,
        end_date: end,
        enrollment,
        attendance: ReportAttendance { counts, records },
        grades,
        fees: fee_summary(invoices, payments),
    })
}

/// Loads the student and checks access. `Err` is the response to send back.
async fn load_report(
    service: &ReportsService,
    student_id: i64,
    query: &ReportQuery,
    request: &HttpRequest,
) -> ActixResult<std::result::Result<StudentReport, HttpResponse>> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let (start, end) = match report_range(query, today()) {
        Ok(range) => range,
        Err(msg) => return Ok(Err(bad_request(ErrorCode::BadRequest, msg))),
    };
    let Some(student) = storage.get_student_by_id(student_id).await? else {
        return Ok(Err(not_found(ErrorCode::StudentNotFound, "Student not found")));
    };
    if !can_see_student_records(storage.as_ref(), &user, student.id).await? {
        return Ok(Err(forbidden(ACCESS_DENIED)));
    }

    Ok(Ok(build_report(storage.as_ref(), student, start, end).await?))
}

pub async fn student_report(
    service: &ReportsService,
    student_id: i64,
    query: ReportQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match load_report(service, student_id, &query, request).await? {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report, "Report generated"))),
        Err(response) => Ok(response),
    }
}

pub(crate) fn render_student_report(report: &StudentReport) -> Result<Vec<u8>> {
    let student = &report.student;
    let mut pdf = PdfWriter::new("Student Report")?;
    pdf.title("Student Report");
    pdf.line(&format!(
        "Student: {} ({})",
        student.full_name(),
        student.student_id
    ));
    if let Some(enrollment) = &report.enrollment {
        pdf.line(&format!(
            "Class: {} ({})",
            enrollment.class_group_name, enrollment.academic_year_name
        ));
    }
    pdf.line(&format!("Range: {} to {}", report.start_date, report.end_date));

    let att = &report.attendance.counts;
    pdf.heading("Attendance Summary");
    pdf.line(&format!(
        "Present: {}  Late: {}  Absent: {}  Total: {}",
        att.present, att.late, att.absent, att.total
    ));

    let fees = &report.fees;
    pdf.heading("Fees Summary");
    pdf.line(&format!(
        "Invoiced: {}  Paid: {}  Balance: {}",
        fees.total_invoiced, fees.total_paid, fees.balance
    ));

    pdf.heading("Recent Grades");
    if report.grades.is_empty() {
        pdf.line("No grades recorded in this range.");
    }
    for grade in report.grades.iter().take(PDF_GRADE_ROWS) {
        pdf.paragraph(&format!(
            "{}  {}  {}: {}/{} ({:.1}%)",
            grade.date,
            grade.subject_name,
            grade.assessment_title,
            grade.score,
            grade.max_score,
            grade.percentage
        ));
    }

    pdf.finish()
}

pub async fn student_report_pdf(
    service: &ReportsService,
    student_id: i64,
    query: ReportQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let report = match load_report(service, student_id, &query, request).await? {
        Ok(report) => report,
        Err(response) => return Ok(response),
    };

    let bytes = render_student_report(&report)?;
    let filename = format!(
        "report_{}_{}_{}.pdf",
        report.student.student_id, report.start_date, report.end_date
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
    use crate::models::finance::entities::{FeeInvoice, InvoiceStatus};
    use crate::models::people::requests::CreateStudentRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_report_range() {
        let now = d(2025, 3, 18);
        assert_eq!(
            report_range(&ReportQuery::default(), now),
            Ok((d(2025, 3, 1), now))
        );
        let query = ReportQuery {
            start_date: Some(d(2025, 3, 10)),
            end_date: Some(d(2025, 3, 9)),
        };
        assert_eq!(
            report_range(&query, now),
            Err("End date must be after start date.")
        );
        let same_day = ReportQuery {
            start_date: Some(now),
            end_date: Some(now),
        };
        assert!(report_range(&same_day, now).is_ok());
    }

    fn invoice_row(id: i64, total: i64, paid: i64) -> InvoiceRow {
        InvoiceRow {
            invoice: FeeInvoice {
                id,
                student_id: 1,
                parent_id: None,
                fee_structure_id: 1,
                issue_date: d(2025, 1, 1),
                due_date: d(2025, 1, 31),
                total_amount: Money::from_cents(total),
                status: InvoiceStatus::Partial,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
            student_code: "BB-1".to_string(),
            student_name: "Tariro Dube".to_string(),
            fee_structure_name: "Term 1".to_string(),
            paid: Money::from_cents(paid),
            balance: Money::from_cents((total - paid).max(0)),
        }
    }

    #[test]
    fn test_fee_summary_totals_every_invoice() {
        let invoices: Vec<InvoiceRow> = (1..=60).map(|id| invoice_row(id, 1000, 250)).collect();
        let fees = fee_summary(invoices, Vec::new());
        assert_eq!(fees.invoices.len(), FEE_ROWS);
        assert_eq!(fees.total_invoiced, Money::from_cents(60_000));
        assert_eq!(fees.total_paid, Money::from_cents(15_000));
        assert_eq!(fees.balance, Money::from_cents(45_000));

        let overpaid = fee_summary(vec![invoice_row(1, 1000, 1500)], Vec::new());
        assert_eq!(overpaid.balance, Money::ZERO);
    }

    #[tokio::test]
    async fn test_build_report_counts_range() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let student = storage
            .create_student(CreateStudentRequest {
                student_id: "BB-9".to_string(),
                first_name: "Kuda".to_string(),
                last_name: "Moyo".to_string(),
                date_of_birth: d(2016, 4, 9),
                admission_date: None,
                grade: "Grade 3".to_string(),
                status: None,
            })
            .await
            .unwrap();

        let report = build_report(&storage, student, d(2025, 3, 1), d(2025, 3, 31))
            .await
            .unwrap();
        assert_eq!(report.attendance.counts.total, 0);
        assert!(report.grades.is_empty());
        assert_eq!(report.fees.balance, Money::ZERO);

        let bytes = render_student_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
