//! Canvas signatures submitted as `data:` URLs.

use std::path::Path;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use super::uploads;
use crate::error::{AppError, AppResult};

const MAX_SIGNATURE_BYTES: usize = 2 * 1024 * 1024;

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg);base64,([A-Za-z0-9+/]+={0,2})$").expect("valid regex")
});

/// A decoded signature image.
#[derive(Debug, PartialEq, Eq)]
pub struct SignatureImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Decode a signature data URL. Only PNG and JPEG images are accepted and the
/// decoded bytes must carry the matching file signature.
pub fn decode_data_url(data_url: &str) -> AppResult<SignatureImage> {
    let compact: String = data_url.chars().filter(|c| !c.is_whitespace()).collect();
    let caps = DATA_URL
        .captures(&compact)
        .ok_or_else(|| AppError::InvalidInput("Format de signature invalide".into()))?;

    let extension = match &caps[1] {
        "png" => "png",
        _ => "jpg",
    };
    let bytes = STANDARD
        .decode(&caps[2])
        .map_err(|_| AppError::InvalidInput("Signature mal encodée".into()))?;
    if bytes.is_empty() || bytes.len() > MAX_SIGNATURE_BYTES {
        return Err(AppError::InvalidInput("Taille de signature invalide".into()));
    }

    let magic_ok = match extension {
        "png" => bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        _ => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
    };
    if !magic_ok {
        return Err(AppError::InvalidInput(
            "Le contenu de la signature ne correspond pas à son type".into(),
        ));
    }

    Ok(SignatureImage { extension, bytes })
}

/// Decode and store a signature under `uploads/signatures/`; returns the path
/// relative to the uploads directory.
pub async fn store_signature(uploads_dir: &Path, prefix: &str, data_url: &str) -> AppResult<String> {
    let image = decode_data_url(data_url)?;
    uploads::store_file(uploads_dir, "signatures", prefix, image.extension, &image.bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_data_url() -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(PNG_HEADER))
    }

    #[test]
    fn test_decodes_png() {
        let image = decode_data_url(&png_data_url()).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.bytes, PNG_HEADER);
    }

    #[test]
    fn test_rejects_other_types_and_bad_base64() {
        assert!(decode_data_url("data:image/gif;base64,R0lGOD").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
        assert!(decode_data_url("https://example.com/a.png").is_err());
        assert!(decode_data_url("").is_err());
    }

    #[test]
    fn test_rejects_mismatched_content() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(b"<svg></svg>"));
        assert!(decode_data_url(&url).is_err());
    }

    #[actix_rt::test]
    async fn test_store_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_signature(dir.path(), "bail_1_loc_2", &png_data_url())
            .await
            .unwrap();
        assert!(path.starts_with("signatures/bail_1_loc_2_"));
        assert!(dir.path().join(path).exists());
    }
}
