// src/utils.rs

/// Normalize an uploaded file name for use as a storage key segment.
/// The extension is kept, everything else outside `[a-z0-9-_]` becomes `_`.
pub fn normalize_file_name(name: &str) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let clean = |s: &str| -> String {
        s.to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };

    match ext {
        Some(ext) => format!("{}.{}", clean(stem), clean(ext)),
        None => clean(stem),
    }
}

/// Storage key for a user's CV: `{user_id}/{file name}`.
pub fn cv_object_path(user_id: &str, file_name: &str) -> String {
    format!("{}/{}", user_id, normalize_file_name(file_name))
}

/// Split a free-text requirements field into ordered skill tags.
pub fn split_skills(requirements: &str) -> Vec<String> {
    requirements
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_file_name() {
        assert_eq!(normalize_file_name("Mon CV 2024.PDF"), "mon_cv_2024.pdf");
        assert_eq!(normalize_file_name("jean-paul_cv.pdf"), "jean-paul_cv.pdf");
        assert_eq!(normalize_file_name("../x/cv.pdf"), "___x_cv.pdf");
        assert_eq!(normalize_file_name(".hidden"), "_hidden");
    }

    #[test]
    fn test_cv_object_path() {
        assert_eq!(cv_object_path("user-1", "CV Final.pdf"), "user-1/cv_final.pdf");
    }

    #[test]
    fn test_split_skills() {
        assert_eq!(
            split_skills("Docker, Kubernetes,AWS ,, CI/CD"),
            vec!["Docker", "Kubernetes", "AWS", "CI/CD"]
        );
        assert!(split_skills("  ").is_empty());
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("test.pdf"), Some("pdf".to_string()));
        assert_eq!(get_file_extension("document.PDF"), Some("pdf".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }
}
