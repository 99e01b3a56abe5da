use sdkforge_core::ExportFormat;

/// Archive name for a generated SDK: `{api}_{language}_sdk.zip`.
///
/// Falls back to `sdk` when the job reported no API name. Names are kept as
/// given apart from characters no file system accepts.
pub fn sdk_archive_filename(api_name: Option<&str>, language: &str) -> String {
    let api = api_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("sdk");
    format!(
        "{}_{}_sdk.zip",
        replace_forbidden(api),
        replace_forbidden(language)
    )
}

pub fn export_filename(format: ExportFormat) -> String {
    format!("openapi.{}", format.as_str())
}

fn replace_forbidden(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

#[cfg(test)]
mod tests {
    use super::{export_filename, sdk_archive_filename};
    use sdkforge_core::ExportFormat;

    #[test]
    fn archive_name_uses_api_and_language() {
        assert_eq!(
            sdk_archive_filename(Some("petstore"), "python"),
            "petstore_python_sdk.zip"
        );
    }

    #[test]
    fn archive_name_falls_back_without_api_name() {
        assert_eq!(sdk_archive_filename(None, "go"), "sdk_go_sdk.zip");
        assert_eq!(sdk_archive_filename(Some("  "), "go"), "sdk_go_sdk.zip");
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        assert_eq!(
            sdk_archive_filename(Some("My API: v2/beta"), "typescript"),
            "My API_ v2_beta_typescript_sdk.zip"
        );
    }

    #[test]
    fn spaces_and_dots_are_kept() {
        assert_eq!(
            sdk_archive_filename(Some("Pet Store"), "python"),
            "Pet Store_python_sdk.zip"
        );
        assert_eq!(
            sdk_archive_filename(Some("api.v2."), "go"),
            "api.v2._go_sdk.zip"
        );
    }

    #[test]
    fn export_names_follow_format() {
        assert_eq!(export_filename(ExportFormat::Json), "openapi.json");
        assert_eq!(export_filename(ExportFormat::Yaml), "openapi.yaml");
    }
}
