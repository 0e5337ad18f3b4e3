use crate::dataset::DatasetFormat;

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "Diver".to_string();
    }
    trimmed.chars().take(16).collect()
}

pub fn parse_reward_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.parse::<usize>().ok())
}

/// The format hint comes from the file name the host saw; the parser itself
/// never inspects names.
pub fn dataset_format_from_file_name(file_name: &str) -> Option<DatasetFormat> {
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.trim().to_ascii_lowercase().as_str() {
        "json" => Some(DatasetFormat::Structured),
        "csv" | "txt" => Some(DatasetFormat::Delimited),
        _ => None,
    }
}
