use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use super::{FinanceService, can_view_invoice};
use crate::config::AppConfig;
use crate::errors::BusyBeeError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    finance::{
        entities::InvoiceStatus,
        requests::{NewProof, ProofQueueQuery, VerifyProofRequest},
        responses::{ProofQueueResponse, ProofResponse, VerifyProofResponse},
    },
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found};
use crate::services::system::DynamicConfig;
use crate::utils::dates::today;
use crate::utils::file_magic::{content_type_for, extension_of};
use crate::utils::validate_magic_bytes;

const PROOF_QUEUE_LIMIT: u64 = 300;
const MAX_NOTE_LEN: usize = 1000;

fn upload_failed(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::FileUploadFailed, message))
}

/// Stores a proof of payment and moves the invoice to pending verification.
pub async fn upload_pop(
    service: &FinanceService,
    invoice_id: i64,
    mut payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(invoice) = storage.get_invoice(invoice_id).await? else {
        return Ok(not_found(ErrorCode::InvoiceNotFound, "Invoice not found"));
    };
    if !can_view_invoice(storage.as_ref(), &user, invoice.invoice.student_id).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }
    if invoice.invoice.status == InvoiceStatus::Paid {
        return Ok(bad_request(ErrorCode::BadRequest, "This invoice is already paid."));
    }

    let upload_dir = &AppConfig::get().upload.dir;
    let max_size = DynamicConfig::upload_max_size().await;
    let allowed_types = DynamicConfig::upload_allowed_types().await;

    if !Path::new(upload_dir).exists()
        && let Err(e) = fs::create_dir_all(upload_dir)
    {
        tracing::error!("{}", BusyBeeError::file_operation(format!("{e}")));
        return Ok(upload_failed("Failed to create the upload directory"));
    }

    let mut original_name = String::new();
    let mut stored_name = String::new();
    let mut extension = String::new();
    let mut file_size: i64 = 0;
    let mut file_uploaded = false;
    let mut note = String::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                if file_uploaded {
                    let _ = fs::remove_file(format!("{upload_dir}/{stored_name}"));
                    return Ok(bad_request(
                        ErrorCode::MultifileUploadNotAllowed,
                        "Only one file can be uploaded at a time",
                    ));
                }
                file_uploaded = true;

                original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                extension = extension_of(&original_name).unwrap_or_default();
                if !allowed_types.iter().any(|t| t.to_lowercase() == extension) {
                    return Ok(bad_request(
                        ErrorCode::FileTypeNotAllowed,
                        format!("Allowed file types: {}", allowed_types.join(" ")),
                    ));
                }

                stored_name = format!("{}{}", Uuid::new_v4(), extension);
                let file_path = format!("{upload_dir}/{stored_name}");
                let mut f = match File::create(&file_path) {
                    Ok(file) => file,
                    Err(e) => {
                        tracing::error!("{}", BusyBeeError::file_operation(format!("{e}")));
                        return Ok(upload_failed("Failed to store the file"));
                    }
                };

                let mut total_size: usize = 0;
                let mut first_chunk = true;
                while let Some(chunk) = field.next().await {
                    let data = chunk?;

                    if first_chunk {
                        first_chunk = false;
                        if !validate_magic_bytes(&data, &extension) {
                            let _ = fs::remove_file(&file_path);
                            return Ok(bad_request(
                                ErrorCode::FileTypeNotAllowed,
                                "File content does not match its extension",
                            ));
                        }
                    }

                    total_size += data.len();
                    if total_size > max_size {
                        let _ = fs::remove_file(&file_path);
                        return Ok(bad_request(
                            ErrorCode::FileSizeExceeded,
                            "File size exceeds the limit",
                        ));
                    }
                    f.write_all(&data)?;
                }
                file_size = total_size as i64;
            }
            "note" => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                note = String::from_utf8_lossy(&bytes)
                    .trim()
                    .chars()
                    .take(MAX_NOTE_LEN)
                    .collect();
            }
            _ => {}
        }
    }

    if !file_uploaded {
        return Ok(bad_request(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        ));
    }
    if file_size == 0 {
        let _ = fs::remove_file(format!("{upload_dir}/{stored_name}"));
        return Ok(bad_request(ErrorCode::FileUploadFailed, "The uploaded file is empty"));
    }

    let created = storage
        .create_proof(NewProof {
            invoice_id,
            uploaded_by: user.id,
            stored_name: stored_name.clone(),
            original_name,
            content_type: content_type_for(&extension).to_string(),
            file_size,
            note,
        })
        .await;
    let (proof, invoice_status) = match created {
        Ok(created) => created,
        Err(e) => {
            let _ = fs::remove_file(format!("{upload_dir}/{stored_name}"));
            return Err(e.into());
        }
    };
    tracing::info!(
        "Proof of payment {} uploaded for invoice {} by user {}",
        proof.id,
        invoice_id,
        user.id
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(
        ProofResponse {
            proof,
            invoice_status,
        },
        "Proof of payment uploaded. The school will verify it shortly.",
    )))
}

pub async fn verification_queue(
    service: &FinanceService,
    query: ProofQueueQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage.proof_queue(query.q, PROOF_QUEUE_LIMIT).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ProofQueueResponse { items },
        "Verification queue retrieved successfully",
    )))
}

pub async fn verify_proof(
    service: &FinanceService,
    proof_id: i64,
    body: VerifyProofRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if body.amount.is_some_and(|amount| !amount.is_positive()) {
        return Ok(bad_request(ErrorCode::BadRequest, "Amount must be greater than zero"));
    }
    let storage = service.get_storage(request);

    let Some(proof) = storage.get_proof(proof_id).await? else {
        return Ok(not_found(ErrorCode::ProofNotFound, "Proof of payment not found"));
    };
    if proof.verified {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::ProofAlreadyVerified,
            "Proof of payment is already verified",
        )));
    }

    let outcome = storage
        .verify_proof(proof_id, body, user.id, today())
        .await?;
    tracing::info!(
        "Proof {} verified by user {}; invoice {} is {}",
        proof_id,
        user.id,
        outcome.proof.invoice_id,
        outcome.status
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        VerifyProofResponse {
            proof: outcome.proof,
            payment: outcome.payment,
            invoice_status: outcome.status,
            remaining: outcome.remaining,
        },
        "Proof of payment verified",
    )))
}

pub async fn download_proof(
    service: &FinanceService,
    proof_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(proof) = storage.get_proof(proof_id).await? else {
        return Ok(not_found(ErrorCode::ProofNotFound, "Proof of payment not found"));
    };
    let Some(invoice) = storage.get_invoice(proof.invoice_id).await? else {
        return Ok(not_found(ErrorCode::InvoiceNotFound, "Invoice not found"));
    };
    if !can_view_invoice(storage.as_ref(), &user, invoice.invoice.student_id).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    let file_path = format!("{}/{}", AppConfig::get().upload.dir, proof.stored_name);
    let buf = match fs::read(&file_path) {
        Ok(buf) => buf,
        Err(e) => {
            tracing::error!("{}", BusyBeeError::file_operation(format!("{file_path}: {e}")));
            return Ok(not_found(ErrorCode::FileNotFound, "File not found"));
        }
    };

    let download_name = proof.original_name.replace(['"', '\\'], "_");
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, proof.content_type.clone()))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{download_name}\""),
        ))
        .body(buf))
}
