//! URI normalization against the root file

use std::borrow::Cow;

/// Base directory of a root file reference, including the trailing `/`
///
/// References without any `/` resolve against `./`.
pub fn base_url(root_file: &str) -> String {
    match root_file.rfind('/') {
        Some(idx) => root_file[..=idx].to_string(),
        None => "./".to_string(),
    }
}

/// Compute the asset map key for a requested URI
///
/// Percent-decodes the URI, strips the root file's base directory when it is
/// a prefix, strips one leading `./` or `/`, then prepends `root_path`.
pub fn normalize_uri(uri: &str, root_file: &str, root_path: &str) -> String {
    let decoded = urlencoding::decode(uri).unwrap_or(Cow::Borrowed(uri));
    let decoded: &str = &decoded;
    let base = base_url(root_file);

    let relative = decoded.strip_prefix(base.as_str()).unwrap_or(decoded);
    let relative = relative
        .strip_prefix("./")
        .or_else(|| relative.strip_prefix('/'))
        .unwrap_or(relative);

    format!("{}{}", root_path, relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("https://example.com/models/duck.gltf"), "https://example.com/models/");
        assert_eq!(base_url("models/duck.gltf"), "models/");
        assert_eq!(base_url("duck.gltf"), "./");
    }

    #[test]
    fn test_normalize_plain_relative() {
        assert_eq!(normalize_uri("duck.bin", "models/duck.gltf", "models/"), "models/duck.bin");
    }

    #[test]
    fn test_normalize_decodes_percent_encoding() {
        assert_eq!(
            normalize_uri("my%20texture.png", "duck.gltf", ""),
            "my texture.png"
        );
    }

    #[test]
    fn test_normalize_strips_base_prefix() {
        assert_eq!(
            normalize_uri(
                "https://example.com/models/tex/a.png",
                "https://example.com/models/duck.gltf",
                "bundle/"
            ),
            "bundle/tex/a.png"
        );
    }

    #[test]
    fn test_normalize_strips_single_leading_fragment() {
        assert_eq!(normalize_uri("./tex/a.png", "duck.gltf", ""), "tex/a.png");
        assert_eq!(normalize_uri("/tex/a.png", "x/duck.gltf", "x/"), "x/tex/a.png");
        assert_eq!(normalize_uri("././a.png", "x/duck.gltf", ""), "./a.png");
    }

    #[test]
    fn test_normalize_keeps_invalid_encoding() {
        assert_eq!(normalize_uri("bad%ZZname.bin", "duck.gltf", ""), "bad%ZZname.bin");
    }
}
