use keepsake_core::media_kind::extension_of;
use keepsake_core::AppError;

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File has no extension: {0}")]
    MissingExtension(String),

    #[error("Empty file")]
    EmptyFile,

    #[error("No file uploaded")]
    MissingFile,

    #[error("{0} is required")]
    MissingField(&'static str),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::InvalidExtension { .. } | ValidationError::MissingExtension(_) => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            ValidationError::EmptyFile
            | ValidationError::MissingFile
            | ValidationError::MissingField(_) => AppError::Validation(err.to_string()),
        }
    }
}

/// Media file validator
///
/// Every check here runs before any byte is written anywhere.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl MediaValidator {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension and return it lowercased
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = extension_of(filename)
            .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Trimmed, non-empty text field
    pub fn require_field(
        &self,
        name: &'static str,
        value: Option<&str>,
    ) -> Result<String, ValidationError> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(ValidationError::MissingField(name))
    }
}

/// Keep only the final path component and replace anything unusual.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() {
        "file".to_string()
    } else {
        s
    }
}
