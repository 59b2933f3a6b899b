//! Doctor command - verify credentials and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Docent Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_checks = vec![
        check_openai_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()),
        check_index(settings),
    ];
    print_all(&api_checks);
    checks.extend(api_checks);

    println!();

    println!("{}", style("Google Services").bold());
    let google_checks = vec![
        check_token("Drive", settings.drive.access_token.as_deref(), "GOOGLE_DRIVE_TOKEN"),
        check_token("Gmail", settings.mail.access_token.as_deref(), "GMAIL_TOKEN"),
    ];
    print_all(&google_checks);
    checks.extend(google_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_checks = vec![
        check_directory("Data directory", &settings.data_dir()),
        check_directory("Report directory", &settings.report_dir()),
        check_directory("Fallback report directory", &settings.report_fallback_dir()),
    ];
    print_all(&dir_checks);
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Docent.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All required checks passed with {} warning(s). Some tools will report what is missing.",
            warnings
        ));
    } else {
        Output::success("All checks passed! Docent is ready to use.");
    }

    Ok(())
}

fn print_all(checks: &[CheckResult]) {
    for check in checks {
        check.print();
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key(key: Option<&str>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Some("") => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check that the document index is configured.
fn check_index(settings: &Settings) -> CheckResult {
    match settings.search.index_id() {
        Some(id) => CheckResult::ok("Document index", id),
        None => CheckResult::warning(
            "Document index",
            "not configured (file search and research reports disabled)",
            "Run: docent index <folder>, then set VECTOR_STORE_ID",
        ),
    }
}

/// Check an OAuth access token.
fn check_token(service: &str, token: Option<&str>, env_var: &str) -> CheckResult {
    match token {
        Some(_) => CheckResult::ok(service, "access token configured"),
        None => CheckResult::warning(
            service,
            "no access token",
            &format!("Set {} to an OAuth access token", env_var),
        ),
    }
}

/// Check that a directory exists or can be created.
fn check_directory(name: &str, dir: &Path) -> CheckResult {
    if dir.is_dir() {
        CheckResult::ok(name, &dir.display().to_string())
    } else if dir.exists() {
        CheckResult::error(
            name,
            &format!("{} is not a directory", dir.display()),
            "Point the setting at a directory",
        )
    } else {
        CheckResult::warning(
            name,
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: docent config edit",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_api_key() {
        assert_eq!(check_openai_api_key(None).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key(Some("")).status, CheckStatus::Error);
        assert_eq!(check_openai_api_key(Some("abc")).status, CheckStatus::Warning);

        let result = check_openai_api_key(Some("sk-1234567890abcdefghijklmn"));
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(!result.message.contains("890abcdefghij"));
    }

    #[test]
    fn test_check_index_and_tokens() {
        let mut settings = Settings::default();
        settings.search.vector_store_id = Some("   ".to_string());
        assert_eq!(check_index(&settings).status, CheckStatus::Warning);

        settings.search.vector_store_id = Some("vs_123".to_string());
        assert_eq!(check_index(&settings).status, CheckStatus::Ok);

        assert_eq!(check_token("Gmail", None, "GMAIL_TOKEN").status, CheckStatus::Warning);
        assert_eq!(check_token("Gmail", Some("t"), "GMAIL_TOKEN").status, CheckStatus::Ok);
    }

    #[test]
    fn test_check_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(check_directory("d", dir.path()).status, CheckStatus::Ok);
        assert_eq!(
            check_directory("d", &dir.path().join("missing")).status,
            CheckStatus::Warning
        );

        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert_eq!(check_directory("d", &file).status, CheckStatus::Error);
    }
}
