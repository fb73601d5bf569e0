use crate::utils::error::{ImportError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 驗證網路主網域（不含 scheme 與路徑）
pub fn validate_domain(field_name: &str, domain: &str) -> Result<()> {
    validate_non_empty_string(field_name, domain)?;

    let invalid = |reason: String| ImportError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: domain.to_string(),
        reason,
    };

    if domain.contains("://") || domain.contains('/') {
        return Err(invalid("Domain must not include a scheme or path".to_string()));
    }

    match Url::parse(&format!("http://{}/", domain)) {
        Ok(url) => match url.host_str() {
            Some(host) if host.eq_ignore_ascii_case(domain) => Ok(()),
            _ => Err(invalid("Domain must be a bare host name".to_string())),
        },
        Err(e) => Err(invalid(format!("Invalid domain: {}", e))),
    }
}

pub fn validate_base_path(field_name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') || !path.ends_with('/') {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Base path must start and end with '/'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ImportError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("network.base_domain", "example.com").is_ok());
        assert!(validate_domain("network.base_domain", "www.example.com").is_ok());
        assert!(validate_domain("network.base_domain", "localhost").is_ok());
        assert!(validate_domain("network.base_domain", "").is_err());
        assert!(validate_domain("network.base_domain", "https://example.com").is_err());
        assert!(validate_domain("network.base_domain", "example.com/blog").is_err());
        assert!(validate_domain("network.base_domain", "exa mple.com").is_err());
    }

    #[test]
    fn test_validate_base_path() {
        assert!(validate_base_path("network.base_path", "/").is_ok());
        assert!(validate_base_path("network.base_path", "/sites/").is_ok());
        assert!(validate_base_path("network.base_path", "sites/").is_err());
        assert!(validate_base_path("network.base_path", "/sites").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("import.max_rows", 20, 1).is_ok());
        assert!(validate_positive_number("import.max_rows", 0, 1).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("platform.json".to_string());
        assert!(validate_required_field("platform.snapshot", &present).is_ok());
        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("platform.snapshot", &missing),
            Err(ImportError::MissingConfigError { .. })
        ));
    }
}
