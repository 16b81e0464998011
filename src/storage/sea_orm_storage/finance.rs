use std::collections::HashMap;

use chrono::NaiveDate;

use super::{SeaOrmStorage, db_err, joins, now_ts, write_err};
use crate::entity::{fee_invoices, fee_structures, payment_proofs, payments};
use crate::errors::{BusyBeeError, Result};
use crate::models::finance::{
    entities::{
        DEFAULT_PAYMENT_METHOD, FeeStructure, FinanceStats, InvoiceRow, InvoiceSnapshot,
        InvoiceStatus, Payment, PaymentOutcome, PaymentProof, ProofQueueRow, ReminderTarget,
        VerifyOutcome, remaining_balance,
    },
    requests::{NewInvoice, NewPayment, NewProof, VerifyProofRequest},
};
use crate::storage::DateRange;
use crate::utils::Money;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Sum of payments per invoice. `None` covers every invoice.
async fn paid_sums<C: ConnectionTrait>(
    db: &C,
    invoice_ids: Option<Vec<i64>>,
) -> Result<HashMap<i64, Money>> {
    let mut select = payments::Entity::find()
        .select_only()
        .column(payments::Column::InvoiceId)
        .column(payments::Column::Amount);
    if let Some(ids) = invoice_ids {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        select = select.filter(payments::Column::InvoiceId.is_in(ids));
    }
    let rows: Vec<(i64, i64)> = select
        .into_tuple()
        .all(db)
        .await
        .map_err(db_err("Failed to sum payments"))?;

    let mut sums: HashMap<i64, Money> = HashMap::new();
    for (invoice_id, amount) in rows {
        *sums.entry(invoice_id).or_default() += Money::from_cents(amount);
    }
    Ok(sums)
}

async fn paid_sum<C: ConnectionTrait>(db: &C, invoice_id: i64) -> Result<Money> {
    Ok(paid_sums(db, Some(vec![invoice_id]))
        .await?
        .remove(&invoice_id)
        .unwrap_or_default())
}

async fn invoice_rows<C: ConnectionTrait>(
    db: &C,
    rows: Vec<fee_invoices::Model>,
) -> Result<Vec<InvoiceRow>> {
    let students = joins::students_by_ids(db, rows.iter().map(|r| r.student_id)).await?;
    let mut structure_ids: Vec<i64> = rows.iter().map(|r| r.fee_structure_id).collect();
    structure_ids.sort_unstable();
    structure_ids.dedup();
    let structures: HashMap<i64, String> = if structure_ids.is_empty() {
        HashMap::new()
    } else {
        fee_structures::Entity::find()
            .filter(fee_structures::Column::Id.is_in(structure_ids))
            .all(db)
            .await
            .map_err(db_err("Failed to load fee structures"))?
            .into_iter()
            .map(|f| (f.id, f.name))
            .collect()
    };
    let sums = paid_sums(db, Some(rows.iter().map(|r| r.id).collect())).await?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let student = students.get(&r.student_id);
            let paid = sums.get(&r.id).copied().unwrap_or_default();
            InvoiceRow {
                student_code: student.map(|s| s.student_id.clone()).unwrap_or_default(),
                student_name: student.map(|s| s.full_name()).unwrap_or_default(),
                fee_structure_name: structures
                    .get(&r.fee_structure_id)
                    .cloned()
                    .unwrap_or_default(),
                paid,
                balance: remaining_balance(Money::from_cents(r.total_amount), paid),
                invoice: r.into_invoice(),
            }
        })
        .collect())
}

/// Writes the status implied by the payments on record.
async fn refresh_invoice_status<C: ConnectionTrait>(
    db: &C,
    invoice: fee_invoices::Model,
) -> Result<(InvoiceStatus, Money)> {
    let total = Money::from_cents(invoice.total_amount);
    let paid = paid_sum(db, invoice.id).await?;
    let unverified = payment_proofs::Entity::find()
        .filter(payment_proofs::Column::InvoiceId.eq(invoice.id))
        .filter(payment_proofs::Column::Verified.eq(false))
        .count(db)
        .await
        .map_err(db_err("Failed to count unverified proofs"))?;
    let status = InvoiceStatus::settle(total, paid, unverified > 0);

    let mut model: fee_invoices::ActiveModel = invoice.into();
    model.status = Set(status.to_string());
    model.updated_at = Set(now_ts());
    model
        .update(db)
        .await
        .map_err(db_err("Failed to update invoice status"))?;

    Ok((status, paid))
}

async fn insert_payment<C: ConnectionTrait>(db: &C, payment: NewPayment) -> Result<Payment> {
    let method = match payment.method.trim() {
        "" => DEFAULT_PAYMENT_METHOD.to_string(),
        m => m.to_string(),
    };
    let created = payments::ActiveModel {
        invoice_id: Set(payment.invoice_id),
        payment_date: Set(payment.payment_date),
        amount: Set(payment.amount.cents()),
        method: Set(method),
        reference: Set(payment.reference.trim().to_string()),
        recorded_by: Set(payment.recorded_by),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(write_err("Failed to record payment"))?;

    Ok(created.into_payment())
}

impl SeaOrmStorage {
    pub async fn list_fee_structures_impl(&self) -> Result<Vec<FeeStructure>> {
        let rows = fee_structures::Entity::find()
            .order_by_asc(fee_structures::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list fee structures"))?;

        Ok(rows.into_iter().map(|m| m.into_fee_structure()).collect())
    }

    pub async fn get_fee_structure_impl(&self, id: i64) -> Result<Option<FeeStructure>> {
        let row = fee_structures::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query fee structure"))?;

        Ok(row.map(|m| m.into_fee_structure()))
    }

    pub async fn create_fee_structure_impl(
        &self,
        name: &str,
        grade: &str,
        amount: Money,
    ) -> Result<FeeStructure> {
        let created = fee_structures::ActiveModel {
            name: Set(name.trim().to_string()),
            grade: Set(grade.trim().to_string()),
            amount: Set(amount.cents()),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create fee structure"))?;

        Ok(created.into_fee_structure())
    }

    pub async fn create_invoice_impl(&self, invoice: NewInvoice) -> Result<InvoiceRow> {
        let now = now_ts();
        let created = fee_invoices::ActiveModel {
            student_id: Set(invoice.student_id),
            parent_id: Set(invoice.parent_id),
            fee_structure_id: Set(invoice.fee_structure_id),
            issue_date: Set(invoice.issue_date),
            due_date: Set(invoice.due_date),
            total_amount: Set(invoice.total_amount.cents()),
            status: Set(InvoiceStatus::Unpaid.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err("Failed to create invoice"))?;

        invoice_rows(&self.db, vec![created])
            .await?
            .pop()
            .ok_or_else(|| BusyBeeError::database_operation("Created invoice vanished"))
    }

    pub async fn get_invoice_impl(&self, id: i64) -> Result<Option<InvoiceRow>> {
        let Some(row) = fee_invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query invoice"))?
        else {
            return Ok(None);
        };

        Ok(invoice_rows(&self.db, vec![row]).await?.pop())
    }

    pub async fn list_invoices_impl(
        &self,
        student_ids: Option<&[i64]>,
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<InvoiceRow>> {
        let mut select = fee_invoices::Entity::find();
        if let Some(ids) = student_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(fee_invoices::Column::StudentId.is_in(ids.to_vec()));
        }
        if let Some((start, end)) = range {
            select = select.filter(fee_invoices::Column::IssueDate.between(start, end));
        }
        let rows = select
            .order_by_desc(fee_invoices::Column::IssueDate)
            .order_by_desc(fee_invoices::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list invoices"))?;

        invoice_rows(&self.db, rows).await
    }

    pub async fn count_invoices_impl(&self, student_ids: Option<&[i64]>) -> Result<u64> {
        let mut select = fee_invoices::Entity::find();
        if let Some(ids) = student_ids {
            if ids.is_empty() {
                return Ok(0);
            }
            select = select.filter(fee_invoices::Column::StudentId.is_in(ids.to_vec()));
        }
        select
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count invoices"))
    }

    pub async fn list_payments_impl(&self, invoice_id: i64) -> Result<Vec<Payment>> {
        let rows = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list payments"))?;

        Ok(rows.into_iter().map(|m| m.into_payment()).collect())
    }

    pub async fn list_student_payments_impl(
        &self,
        student_id: i64,
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<Payment>> {
        let invoice_ids: Vec<i64> = fee_invoices::Entity::find()
            .select_only()
            .column(fee_invoices::Column::Id)
            .filter(fee_invoices::Column::StudentId.eq(student_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list invoices"))?;

        if invoice_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select = payments::Entity::find()
            .filter(payments::Column::InvoiceId.is_in(invoice_ids));
        if let Some((start, end)) = range {
            select = select.filter(payments::Column::PaymentDate.between(start, end));
        }
        let rows = select
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list payments"))?;

        Ok(rows.into_iter().map(|m| m.into_payment()).collect())
    }

    pub async fn list_proofs_impl(&self, invoice_id: i64) -> Result<Vec<PaymentProof>> {
        let rows = payment_proofs::Entity::find()
            .filter(payment_proofs::Column::InvoiceId.eq(invoice_id))
            .order_by_desc(payment_proofs::Column::UploadedAt)
            .order_by_desc(payment_proofs::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list proofs"))?;

        Ok(rows.into_iter().map(|m| m.into_proof()).collect())
    }

    pub async fn get_proof_impl(&self, id: i64) -> Result<Option<PaymentProof>> {
        let row = payment_proofs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query proof"))?;

        Ok(row.map(|m| m.into_proof()))
    }

    pub async fn record_payment_impl(&self, payment: NewPayment) -> Result<PaymentOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let invoice = fee_invoices::Entity::find_by_id(payment.invoice_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query invoice"))?
            .ok_or_else(|| BusyBeeError::not_found("Invoice not found"))?;
        let total = Money::from_cents(invoice.total_amount);

        let payment = insert_payment(&txn, payment).await?;
        let (status, paid_sum) = refresh_invoice_status(&txn, invoice).await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit payment"))?;

        Ok(PaymentOutcome {
            payment,
            status,
            paid_sum,
            remaining: remaining_balance(total, paid_sum),
        })
    }

    pub async fn create_proof_impl(&self, proof: NewProof) -> Result<(PaymentProof, InvoiceStatus)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let invoice = fee_invoices::Entity::find_by_id(proof.invoice_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query invoice"))?
            .ok_or_else(|| BusyBeeError::not_found("Invoice not found"))?;

        let created = payment_proofs::ActiveModel {
            invoice_id: Set(proof.invoice_id),
            uploaded_by: Set(proof.uploaded_by),
            uploaded_at: Set(now_ts()),
            stored_name: Set(proof.stored_name),
            original_name: Set(proof.original_name),
            content_type: Set(proof.content_type),
            file_size: Set(proof.file_size),
            note: Set(proof.note.trim().to_string()),
            verified: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(write_err("Failed to store proof"))?;

        let mut model: fee_invoices::ActiveModel = invoice.into();
        model.status = Set(InvoiceStatus::PendingVerification.to_string());
        model.updated_at = Set(now_ts());
        model
            .update(&txn)
            .await
            .map_err(db_err("Failed to update invoice status"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit proof"))?;

        Ok((created.into_proof(), InvoiceStatus::PendingVerification))
    }

    pub async fn proof_queue_impl(
        &self,
        search: Option<String>,
        limit: u64,
    ) -> Result<Vec<ProofQueueRow>> {
        let proofs = payment_proofs::Entity::find()
            .filter(payment_proofs::Column::Verified.eq(false))
            .order_by_desc(payment_proofs::Column::UploadedAt)
            .order_by_desc(payment_proofs::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load proof queue"))?;

        let mut invoice_ids: Vec<i64> = proofs.iter().map(|p| p.invoice_id).collect();
        invoice_ids.sort_unstable();
        invoice_ids.dedup();
        let invoices: HashMap<i64, fee_invoices::Model> = if invoice_ids.is_empty() {
            HashMap::new()
        } else {
            fee_invoices::Entity::find()
                .filter(fee_invoices::Column::Id.is_in(invoice_ids))
                .all(&self.db)
                .await
                .map_err(db_err("Failed to load invoices"))?
                .into_iter()
                .map(|i| (i.id, i))
                .collect()
        };
        let students =
            joins::students_by_ids(&self.db, invoices.values().map(|i| i.student_id)).await?;
        let uploaders = joins::users_by_ids(&self.db, proofs.iter().map(|p| p.uploaded_by)).await?;

        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        Ok(proofs
            .into_iter()
            .filter_map(|p| {
                let invoice = invoices.get(&p.invoice_id)?;
                let student = students.get(&invoice.student_id)?;
                if let Some(n) = &needle
                    && !student.student_id.to_lowercase().contains(n)
                    && !student.last_name.to_lowercase().contains(n)
                {
                    return None;
                }
                Some(ProofQueueRow {
                    student_code: student.student_id.clone(),
                    student_name: student.full_name(),
                    invoice_total: Money::from_cents(invoice.total_amount),
                    invoice_status: invoice
                        .status
                        .parse()
                        .unwrap_or(InvoiceStatus::PendingVerification),
                    uploaded_by_username: uploaders
                        .get(&p.uploaded_by)
                        .map(|u| u.username.clone())
                        .unwrap_or_default(),
                    proof: p.into_proof(),
                })
            })
            .take(limit as usize)
            .collect())
    }

    pub async fn verify_proof_impl(
        &self,
        proof_id: i64,
        req: VerifyProofRequest,
        verifier_id: i64,
        today: NaiveDate,
    ) -> Result<VerifyOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let proof = payment_proofs::Entity::find_by_id(proof_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query proof"))?
            .ok_or_else(|| BusyBeeError::not_found("Proof of payment not found"))?;
        if proof.verified {
            return Err(BusyBeeError::conflict("Proof of payment is already verified"));
        }

        let invoice = fee_invoices::Entity::find_by_id(proof.invoice_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query invoice"))?
            .ok_or_else(|| BusyBeeError::not_found("Invoice not found"))?;
        let total = Money::from_cents(invoice.total_amount);
        let outstanding = remaining_balance(total, paid_sum(&txn, invoice.id).await?);

        let amount = req.amount.unwrap_or(outstanding);
        let payment = if amount.is_positive() {
            let reference = req
                .reference
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| format!("POP #{}", proof.id));
            Some(
                insert_payment(
                    &txn,
                    NewPayment {
                        invoice_id: invoice.id,
                        payment_date: today,
                        amount,
                        method: req.method.unwrap_or_default(),
                        reference,
                        recorded_by: Some(verifier_id),
                    },
                )
                .await?,
            )
        } else {
            None
        };

        let mut model: payment_proofs::ActiveModel = proof.into();
        model.verified = Set(true);
        model.verified_at = Set(Some(now_ts()));
        model.verified_by = Set(Some(verifier_id));
        let verified = model
            .update(&txn)
            .await
            .map_err(db_err("Failed to verify proof"))?;

        let (status, paid) = refresh_invoice_status(&txn, invoice).await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit verification"))?;

        Ok(VerifyOutcome {
            proof: verified.into_proof(),
            payment,
            status,
            remaining: remaining_balance(total, paid),
        })
    }

    pub async fn reminder_targets_impl(&self, cutoff: NaiveDate) -> Result<Vec<ReminderTarget>> {
        let invoices = fee_invoices::Entity::find()
            .filter(fee_invoices::Column::Status.is_in([
                InvoiceStatus::Unpaid.as_str(),
                InvoiceStatus::Partial.as_str(),
            ]))
            .filter(fee_invoices::Column::DueDate.lte(cutoff))
            .order_by_asc(fee_invoices::Column::DueDate)
            .order_by_asc(fee_invoices::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load overdue invoices"))?;

        let students = joins::students_by_ids(&self.db, invoices.iter().map(|i| i.student_id)).await?;
        let parents = joins::users_by_ids(&self.db, invoices.iter().filter_map(|i| i.parent_id)).await?;

        Ok(invoices
            .into_iter()
            .map(|inv| {
                let student = students.get(&inv.student_id);
                let parent = inv.parent_id.and_then(|id| parents.get(&id));
                ReminderTarget {
                    invoice_id: inv.id,
                    total: Money::from_cents(inv.total_amount),
                    due_date: inv.due_date,
                    student_code: student.map(|s| s.student_id.clone()).unwrap_or_default(),
                    student_first_name: student.map(|s| s.first_name.clone()).unwrap_or_default(),
                    student_last_name: student.map(|s| s.last_name.clone()).unwrap_or_default(),
                    parent_id: parent.map(|p| p.id),
                    parent_email: parent
                        .map(|p| p.email.trim().to_string())
                        .filter(|e| !e.is_empty()),
                    parent_phone: parent
                        .and_then(|p| p.phone.clone())
                        .filter(|p| !p.trim().is_empty()),
                }
            })
            .collect())
    }

    pub async fn latest_invoice_snapshots_impl(
        &self,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, InvoiceSnapshot>> {
        if student_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = fee_invoices::Entity::find()
            .filter(fee_invoices::Column::StudentId.is_in(student_ids.to_vec()))
            .order_by_desc(fee_invoices::Column::IssueDate)
            .order_by_desc(fee_invoices::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load invoices"))?;

        let mut latest: HashMap<i64, fee_invoices::Model> = HashMap::new();
        for row in rows {
            latest.entry(row.student_id).or_insert(row);
        }
        let sums = paid_sums(&self.db, Some(latest.values().map(|i| i.id).collect())).await?;

        Ok(latest
            .into_iter()
            .map(|(student_id, inv)| {
                let total = Money::from_cents(inv.total_amount);
                let paid = sums.get(&inv.id).copied().unwrap_or_default();
                (
                    student_id,
                    InvoiceSnapshot {
                        id: inv.id,
                        status: inv.status.parse().unwrap_or(InvoiceStatus::Unpaid),
                        total,
                        paid,
                        balance: remaining_balance(total, paid),
                        due_date: inv.due_date,
                    },
                )
            })
            .collect())
    }

    pub async fn finance_stats_impl(&self, today: NaiveDate) -> Result<FinanceStats> {
        let invoices = fee_invoices::Entity::find()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to load invoices"))?;
        let sums = paid_sums(&self.db, None).await?;

        let mut stats = FinanceStats::default();
        for inv in invoices {
            let status: InvoiceStatus = inv.status.parse().unwrap_or(InvoiceStatus::Unpaid);
            let total = Money::from_cents(inv.total_amount);
            let paid = sums.get(&inv.id).copied().unwrap_or_default();

            stats.invoices_total += 1;
            stats.invoiced_sum += total;
            stats.paid_sum += paid;
            match status {
                InvoiceStatus::Paid => stats.paid += 1,
                _ => {
                    stats.outstanding += 1;
                    stats.outstanding_sum += remaining_balance(total, paid);
                }
            }
            if status == InvoiceStatus::PendingVerification {
                stats.pending_verification += 1;
            }
            if status.is_collectable() && inv.due_date < today {
                stats.overdue += 1;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::academics::tests::d;
    use crate::storage::sea_orm_storage::people::tests::new_student;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    async fn invoice(storage: &SeaOrmStorage, total: &str, due: NaiveDate) -> (InvoiceRow, i64) {
        let parent = storage
            .create_user(new_user(&format!("p{}", total.replace('.', "")), UserRole::Parent))
            .await
            .unwrap();
        let student = storage
            .create_student(new_student(&format!("S{}", parent.id), "Chipo", "Dube"))
            .await
            .unwrap();
        let fees = storage
            .create_fee_structure("Term 1", "Grade 4", money(total))
            .await
            .unwrap();
        let row = storage
            .create_invoice(NewInvoice {
                student_id: student.id,
                parent_id: Some(parent.id),
                fee_structure_id: fees.id,
                issue_date: d(2025, 1, 15),
                due_date: due,
                total_amount: money(total),
            })
            .await
            .unwrap();
        (row, parent.id)
    }

    fn payment(invoice_id: i64, amount: &str) -> NewPayment {
        NewPayment {
            invoice_id,
            payment_date: d(2025, 2, 1),
            amount: money(amount),
            method: String::new(),
            reference: "EcoCash 123".to_string(),
            recorded_by: None,
        }
    }

    #[tokio::test]
    async fn test_payments_drive_status() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let (inv, _) = invoice(&storage, "100.00", d(2025, 2, 28)).await;
        assert_eq!(inv.invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(inv.fee_structure_name, "Term 1");

        let first = storage.record_payment(payment(inv.invoice.id, "40")).await.unwrap();
        assert_eq!(first.status, InvoiceStatus::Partial);
        assert_eq!(first.remaining, money("60"));
        assert_eq!(first.payment.method, DEFAULT_PAYMENT_METHOD);

        let second = storage.record_payment(payment(inv.invoice.id, "75")).await.unwrap();
        assert_eq!(second.status, InvoiceStatus::Paid);
        assert_eq!(second.paid_sum, money("115"));
        assert_eq!(second.remaining, Money::ZERO);

        let row = storage.get_invoice(inv.invoice.id).await.unwrap().unwrap();
        assert_eq!(row.invoice.status, InvoiceStatus::Paid);
        assert_eq!(row.balance, Money::ZERO);

        let missing = storage.record_payment(payment(9999, "1")).await;
        assert!(matches!(missing, Err(BusyBeeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_proof_upload_and_verification() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let (inv, parent_id) = invoice(&storage, "250.00", d(2025, 2, 28)).await;
        storage.record_payment(payment(inv.invoice.id, "50")).await.unwrap();

        let (proof, status) = storage
            .create_proof(NewProof {
                invoice_id: inv.invoice.id,
                uploaded_by: parent_id,
                stored_name: "abc.pdf".to_string(),
                original_name: "receipt.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                file_size: 1200,
                note: " bank transfer ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(status, InvoiceStatus::PendingVerification);
        assert_eq!(proof.note, "bank transfer");

        let queue = storage.proof_queue(Some("dub".to_string()), 300).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].invoice_status, InvoiceStatus::PendingVerification);
        assert!(storage.proof_queue(Some("zzz".to_string()), 300).await.unwrap().is_empty());

        let stats = storage.finance_stats(d(2025, 2, 10)).await.unwrap();
        assert_eq!(stats.pending_verification, 1);
        assert_eq!(stats.overdue, 0);

        let outcome = storage
            .verify_proof(proof.id, VerifyProofRequest::default(), 1, d(2025, 2, 11))
            .await
            .unwrap();
        assert!(outcome.proof.verified);
        assert_eq!(outcome.proof.verified_by, Some(1));
        assert_eq!(outcome.payment.as_ref().map(|p| p.amount), Some(money("200")));
        assert_eq!(outcome.status, InvoiceStatus::Paid);
        assert_eq!(outcome.remaining, Money::ZERO);
        assert!(storage.proof_queue(None, 300).await.unwrap().is_empty());

        let again = storage
            .verify_proof(proof.id, VerifyProofRequest::default(), 1, d(2025, 2, 11))
            .await;
        assert!(matches!(again, Err(BusyBeeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_manual_payment_keeps_pending_proof_in_queue() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let (inv, parent_id) = invoice(&storage, "300.00", d(2025, 2, 28)).await;
        let (proof, _) = storage
            .create_proof(NewProof {
                invoice_id: inv.invoice.id,
                uploaded_by: parent_id,
                stored_name: "pop.png".to_string(),
                original_name: "pop.png".to_string(),
                content_type: "image/png".to_string(),
                file_size: 800,
                note: String::new(),
            })
            .await
            .unwrap();

        let cash = storage.record_payment(payment(inv.invoice.id, "100")).await.unwrap();
        assert_eq!(cash.status, InvoiceStatus::PendingVerification);
        assert_eq!(cash.remaining, money("200"));
        assert_eq!(storage.proof_queue(None, 300).await.unwrap().len(), 1);

        let partial = storage
            .verify_proof(
                proof.id,
                VerifyProofRequest {
                    amount: Some(money("50")),
                    ..Default::default()
                },
                1,
                d(2025, 2, 12),
            )
            .await
            .unwrap();
        assert_eq!(partial.status, InvoiceStatus::Partial);

        let rest = storage.record_payment(payment(inv.invoice.id, "150")).await.unwrap();
        assert_eq!(rest.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_reminders_and_stats() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let (overdue, _) = invoice(&storage, "80.00", d(2025, 1, 31)).await;
        let (recent, _) = invoice(&storage, "90.00", d(2025, 3, 31)).await;
        let (settled, _) = invoice(&storage, "10.00", d(2025, 1, 1)).await;
        storage.record_payment(payment(settled.invoice.id, "10")).await.unwrap();

        let targets = storage.reminder_targets(d(2025, 2, 15)).await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].invoice_id, overdue.invoice.id);
        assert!(targets[0].parent_email.is_some());
        assert!(targets[0].message().starts_with("School Fees Reminder: Chipo Dube"));

        let stats = storage.finance_stats(d(2025, 2, 15)).await.unwrap();
        assert_eq!(stats.invoices_total, 3);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.outstanding, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.invoiced_sum, money("180"));
        assert_eq!(stats.outstanding_sum, money("170"));

        let snapshots = storage
            .latest_invoice_snapshots(&[recent.invoice.student_id])
            .await
            .unwrap();
        assert_eq!(snapshots[&recent.invoice.student_id].total, money("90"));
    }
}
