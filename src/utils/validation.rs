use crate::api::error::{AppError, AppResult};
use std::path::Path;

/// Content types accepted for gallery images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// Content types accepted for the manual and box project documents
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &["application/pdf"];

/// Resolves the content type of a local file.
///
/// Magic bytes win over the extension; unknown content falls back to
/// `application/octet-stream`.
pub fn detect_content_type(file_name: &str, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("pdf") => mime::APPLICATION_PDF.essence_str().to_string(),
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG.essence_str().to_string(),
        Some("png") => mime::IMAGE_PNG.essence_str().to_string(),
        Some("gif") => mime::IMAGE_GIF.essence_str().to_string(),
        Some("bmp") => mime::IMAGE_BMP.essence_str().to_string(),
        Some("webp") => "image/webp".to_string(),
        _ => mime::APPLICATION_OCTET_STREAM.essence_str().to_string(),
    }
}

/// Strips any directory part and replaces characters that are unsafe in a
/// multipart `filename` parameter.
pub fn sanitize_filename(filename: &str) -> AppResult<String> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.trim().is_empty() {
        return Err(AppError::invalid_field("file", "File name cannot be empty"));
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    Ok(sanitized)
}

/// Checks if file content appears to be executable
pub fn is_executable_content(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    // ELF
    if header.starts_with(&[0x7F, 0x45, 0x4C, 0x46]) {
        return true;
    }

    // PE/COFF
    if header.starts_with(&[0x4D, 0x5A]) {
        return true;
    }

    // Mach-O
    if header.starts_with(&[0xFE, 0xED, 0xFA, 0xCE])
        || header.starts_with(&[0xFE, 0xED, 0xFA, 0xCF])
        || header.starts_with(&[0xCE, 0xFA, 0xED, 0xFE])
        || header.starts_with(&[0xCF, 0xFA, 0xED, 0xFE])
    {
        return true;
    }

    header.starts_with(b"#!")
}

fn validate_against(
    field: &str,
    content_type: &str,
    bytes: &[u8],
    allowed: &[&str],
    label: &str,
) -> AppResult<()> {
    if bytes.is_empty() {
        return Err(AppError::invalid_field(field, "File appears to be empty"));
    }
    if is_executable_content(bytes) {
        return Err(AppError::invalid_field(
            field,
            "File contains executable content which is not allowed",
        ));
    }
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if !allowed.iter().any(|&a| a == normalized) {
        return Err(AppError::invalid_field(
            field,
            format!("Only {} files are accepted (got '{}')", label, normalized),
        ));
    }
    Ok(())
}

/// Manual and project slots take PDFs only
pub fn validate_document(field: &str, content_type: &str, bytes: &[u8]) -> AppResult<()> {
    validate_against(field, content_type, bytes, ALLOWED_DOCUMENT_TYPES, "PDF")
}

pub fn validate_gallery_image(content_type: &str, bytes: &[u8]) -> AppResult<()> {
    validate_against("gallery", content_type, bytes, ALLOWED_IMAGE_TYPES, "image")
}
