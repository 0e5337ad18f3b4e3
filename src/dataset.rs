use serde_json::Value;

use crate::types::Question;

pub const FIELD_DELIMITER: char = ',';
pub const OPTION_DELIMITER: char = ';';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    Structured,
    Delimited,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetError {
    /// The top-level value is not a list of records.
    InvalidShape,
    /// Every row was rejected (or the input held no rows at all).
    NoValidRows { rejected: usize },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidShape => write!(f, "dataset is not a list of records"),
            Self::NoValidRows { rejected } => {
                write!(f, "no usable rows in dataset ({rejected} rejected)")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDataset {
    pub questions: Vec<Question>,
    pub accepted: usize,
    pub rejected: usize,
}

/// Ingests externally supplied quiz content. Individual bad rows are dropped
/// without failing the parse; only an unusable whole is an error, so partial
/// low-quality data never blocks gameplay.
pub fn parse_dataset(raw: &str, format: DatasetFormat) -> Result<ParsedDataset, DatasetError> {
    match format {
        DatasetFormat::Structured => parse_structured(raw),
        DatasetFormat::Delimited => parse_delimited(raw),
    }
}

fn parse_structured(raw: &str) -> Result<ParsedDataset, DatasetError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| DatasetError::InvalidShape)?;
    let Some(records) = value.as_array() else {
        return Err(DatasetError::InvalidShape);
    };
    if records.is_empty() {
        return Err(DatasetError::NoValidRows { rejected: 0 });
    }

    let mut questions = Vec::new();
    let mut rejected = 0;
    for record in records {
        match structured_record(record) {
            Some(question) => questions.push(question),
            None => rejected += 1,
        }
    }

    finish(questions, rejected)
}

fn structured_record(value: &Value) -> Option<Question> {
    let object = value.as_object()?;
    let text = object.get("question")?.as_str()?.to_string();
    let options: Vec<String> = object
        .get("options")?
        .as_array()?
        .iter()
        .map(|option| option.as_str().map(str::to_string))
        .collect::<Option<_>>()?;
    if options.len() < 2 {
        return None;
    }
    let correct = object.get("correct")?.as_f64()?;
    to_index(correct).map(|correct| Question {
        text,
        options,
        correct,
    })
}

fn parse_delimited(raw: &str) -> Result<ParsedDataset, DatasetError> {
    let mut questions = Vec::new();
    let mut rejected = 0;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match delimited_row(line) {
            Some(question) => questions.push(question),
            None => rejected += 1,
        }
    }

    finish(questions, rejected)
}

// One row per line: question, options, answer index. Only the first and the
// last field delimiter split the row, so delimiters inside the question text
// survive verbatim.
fn delimited_row(line: &str) -> Option<Question> {
    let first = line.find(FIELD_DELIMITER)?;
    let last = line.rfind(FIELD_DELIMITER)?;
    if first == last {
        return None;
    }

    let text = line[..first].trim();
    if text.is_empty() {
        return None;
    }

    let options: Vec<String> = line[first + 1..last]
        .split(OPTION_DELIMITER)
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect();
    if options.is_empty() {
        return None;
    }

    let correct = line[last + 1..].trim().parse::<f64>().ok()?;
    to_index(correct).map(|correct| Question {
        text: text.to_string(),
        options,
        correct,
    })
}

// A negative value would alias option zero after conversion, so it is
// rejected alongside the non-finite ones.
fn to_index(value: f64) -> Option<usize> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value as usize)
}

fn finish(questions: Vec<Question>, rejected: usize) -> Result<ParsedDataset, DatasetError> {
    if questions.is_empty() {
        return Err(DatasetError::NoValidRows { rejected });
    }
    Ok(ParsedDataset {
        accepted: questions.len(),
        questions,
        rejected,
    })
}
