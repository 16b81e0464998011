//! Content sniffing for uploads.

/// Whether the leading bytes of an upload match its extension.
///
/// `extension` includes the dot (".png"). Unknown extensions are rejected.
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        ".png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        ".jpg" | ".jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        ".gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        ".webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        ".pdf" => data.starts_with(b"%PDF"),
        // Plain text: anything without NUL bytes.
        ".csv" | ".txt" => !data.contains(&0),
        _ => false,
    }
}

/// MIME type served back on download.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".pdf" => "application/pdf",
        ".csv" => "text/csv",
        ".txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Lower-cased extension including the dot, if the name has one.
pub fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validate_magic_bytes(&png_header, ".png"));
        assert!(validate_magic_bytes(&png_header, ".PNG"));
        assert!(!validate_magic_bytes(&png_header, ".pdf"));
    }

    #[test]
    fn test_jpeg_and_pdf_magic() {
        assert!(validate_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0], ".jpg"));
        assert!(validate_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE1], ".jpeg"));
        assert!(validate_magic_bytes(b"%PDF-1.7\n", ".pdf"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".pdf"));
    }

    #[test]
    fn test_csv_rejects_binary() {
        assert!(validate_magic_bytes(b"username,email\n", ".csv"));
        assert!(!validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x00], ".csv"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".png"));
        assert!(!validate_magic_bytes(b"#!/bin/sh", ".sh"));
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(extension_of("Receipt.JPG").as_deref(), Some(".jpg"));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(content_type_for(".pdf"), "application/pdf");
        assert_eq!(content_type_for(".exe"), "application/octet-stream");
    }
}
