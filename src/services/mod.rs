pub mod accounts;
pub mod appointments;
pub mod doctors;
pub mod profiles;

/// Trimmed value of an optional text field, `None` when absent or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
