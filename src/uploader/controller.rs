use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use crate::utils::image::{CompressOptions, compress_image};
use crate::utils::storage::StorageService;

struct UploadField {
    file_name: String,
    data: Vec<u8>,
}

/// Pulls the `data` field out of the multipart body, buffering it in
/// memory like the rest of the request pipeline does.
async fn read_upload_field(mut payload: Multipart) -> Result<UploadField, CustomError> {
    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| CustomError::BadRequestError(format!("Error reading multipart field: {}", e)))?;

        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        if content_disposition.get_name() != Some("data") {
            continue;
        }
        let Some(file_name) = content_disposition.get_filename().map(|f| f.to_string()) else {
            return Err(CustomError::BadRequestError("Bad request".to_string()));
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| CustomError::BadRequestError(format!("Error reading file chunk: {}", e)))?;
            data.extend_from_slice(&chunk);
        }

        return Ok(UploadField { file_name, data });
    }

    Err(CustomError::BadRequestError("Bad request".to_string()))
}

/// POST /admin/posts/{id}/upload
pub async fn upload(
    post_id: web::Path<String>,
    payload: Multipart,
    post_service: web::Data<PostService>,
    storage: web::Data<StorageService>,
) -> Result<HttpResponse, CustomError> {
    // 404 before touching the body when the post is gone.
    post_service.get_post(&post_id.into_inner()).await?;

    let field = read_upload_field(payload).await?;
    let size = field.data.len();

    let ext = field
        .file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let adjusted = compress_image(&field.data, &CompressOptions::for_extension(&ext))?;

    let file_name = format!("{}.{}", ObjectId::new().to_hex(), ext);
    let src = storage.upload(&file_name, adjusted, "uploads").await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "src": src,
        "fileName": file_name,
        "fileSize": size,
    })))
}
