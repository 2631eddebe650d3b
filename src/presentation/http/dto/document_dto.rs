use serde::Serialize;

use crate::application::use_cases::list_run_documents::ListRunDocumentsResponse;
use crate::application::use_cases::upload_documents::{
    SkippedDocument, UploadDocumentsResponse, UploadedDocument,
};
use crate::domain::entities::Document;

#[derive(Debug, Serialize)]
pub struct DocumentResponseDto {
    pub id: i32,
    pub document_name: String,
    pub content_hash: String,
    pub run_id: Option<i32>,
    pub text_extracted: bool,
    pub figures_extracted: bool,
    pub metadata_extracted: bool,
    pub tables_extracted: bool,
    pub formulas_extracted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponseDto {
    fn from(document: Document) -> Self {
        let flags = *document.flags();
        Self {
            id: document.id(),
            document_name: document.document_name().to_string(),
            content_hash: document.content_hash().to_string(),
            run_id: document.run_id(),
            text_extracted: flags.text,
            figures_extracted: flags.figures,
            metadata_extracted: flags.metadata,
            tables_extracted: flags.tables,
            formulas_extracted: flags.formulas,
            created_at: document.created_at().to_rfc3339(),
            updated_at: document.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunDocumentsResponseDto {
    pub run_id: i32,
    pub documents: Vec<DocumentResponseDto>,
    pub total: usize,
}

impl From<ListRunDocumentsResponse> for RunDocumentsResponseDto {
    fn from(response: ListRunDocumentsResponse) -> Self {
        let documents: Vec<DocumentResponseDto> = response
            .documents
            .into_iter()
            .map(DocumentResponseDto::from)
            .collect();
        Self {
            run_id: response.run_id,
            total: documents.len(),
            documents,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadedDocumentDto {
    pub document_id: i32,
    pub document_name: String,
    pub content_hash: String,
}

impl From<UploadedDocument> for UploadedDocumentDto {
    fn from(document: UploadedDocument) -> Self {
        Self {
            document_id: document.document_id,
            document_name: document.document_name,
            content_hash: document.content_hash,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SkippedDocumentDto {
    pub document_name: String,
    pub content_hash: String,
    pub reason: String,
}

impl From<SkippedDocument> for SkippedDocumentDto {
    fn from(document: SkippedDocument) -> Self {
        Self {
            document_name: document.document_name,
            content_hash: document.content_hash,
            reason: "already uploaded to this project".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentsResponseDto {
    pub run_id: i32,
    pub uploaded: Vec<UploadedDocumentDto>,
    pub skipped: Vec<SkippedDocumentDto>,
    pub message: String,
}

impl From<UploadDocumentsResponse> for UploadDocumentsResponseDto {
    fn from(response: UploadDocumentsResponse) -> Self {
        let message = format!(
            "{} document(s) uploaded, {} skipped",
            response.uploaded.len(),
            response.skipped.len()
        );
        Self {
            run_id: response.run_id,
            uploaded: response
                .uploaded
                .into_iter()
                .map(UploadedDocumentDto::from)
                .collect(),
            skipped: response
                .skipped
                .into_iter()
                .map(SkippedDocumentDto::from)
                .collect(),
            message,
        }
    }
}
