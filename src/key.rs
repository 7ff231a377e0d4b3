//! Object key derivation shared by every key-bearing operation.

/// Derive the backend object key from a logical folder path and object name.
///
/// A non-blank folder path prefixes the name as `folder/name`; exactly one
/// leading `/` is then stripped from the combined key. An absent or blank
/// folder path leaves the object name untouched.
pub fn object_key(folder_path: Option<&str>, object_name: &str) -> String {
    let combined = match folder_path {
        Some(folder) if !folder.is_empty() => format!("{}/{}", folder, object_name),
        _ => object_name.to_string(),
    };
    match combined.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => combined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_passes_through() {
        assert_eq!(object_key(None, "a.png"), "a.png");
        assert_eq!(object_key(Some(""), "a.png"), "a.png");
    }

    #[test]
    fn folder_prefixes_name() {
        assert_eq!(object_key(Some("03/18"), "a.png"), "03/18/a.png");
    }

    #[test]
    fn leading_separator_is_stripped_once() {
        assert_eq!(object_key(Some("/03/18"), "a.png"), "03/18/a.png");
        // only the first separator goes, not all of them
        assert_eq!(object_key(Some("//03"), "a.png"), "/03/a.png");
        assert_eq!(object_key(None, "/a.png"), "a.png");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = object_key(Some("/03/18"), "a.png");
        assert_eq!(object_key(None, &once), once);
    }
}
