//! Doctor - Tool availability checking

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::backends::refresh::STEPS;

/// Availability of one refresh tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub package_hint: &'static str,
}

impl ToolStatus {
    fn render_line(&self, color: bool) -> String {
        let marker = match (self.available, color) {
            (true, true) => "✓".green().to_string(),
            (false, true) => "✗".red().to_string(),
            (true, false) => "✓".to_string(),
            (false, false) => "✗".to_string(),
        };

        let location = self
            .path
            .as_ref()
            .map(|p| format!("found: {}", p.display()))
            .unwrap_or_else(|| format!("not found (provided by {})", self.package_hint));

        format!("{} {} - {}", marker, self.name, location)
    }
}

/// Distribution package that usually ships each tool
fn package_hint(program: &str) -> &'static str {
    match program {
        "glib-compile-schemas" => "glib2 / libglib2.0-bin",
        "gtk-update-icon-cache" => "gtk3 / gtk-update-icon-cache",
        "update-mime-database" => "shared-mime-info",
        "update-desktop-database" => "desktop-file-utils",
        _ => "unknown",
    }
}

/// Check every tool the refresh sequence invokes, in execution order
pub fn check_tools() -> Vec<ToolStatus> {
    check_tools_with(|program| which::which(program).ok())
}

fn check_tools_with<F>(resolve: F) -> Vec<ToolStatus>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    STEPS
        .iter()
        .map(|step| {
            let program = step.program();
            let path = resolve(program);
            ToolStatus {
                name: program.to_string(),
                available: path.is_some(),
                path,
                package_hint: package_hint(program),
            }
        })
        .collect()
}

/// Render the doctor output (JSON array or one line per tool)
pub fn render(tools: &[ToolStatus], json: bool, color: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(tools)?);
    }

    Ok(tools
        .iter()
        .map(|t| t.render_line(color))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Run the doctor command
pub fn run_doctor(json: bool, color: bool) -> Result<()> {
    let tools = check_tools();
    println!("{}", render(&tools, json, color)?);

    let missing = tools.iter().filter(|t| !t.available).count();
    if missing > 0 {
        eprintln!(
            "\n⚠️  {} of {} tools missing; their caches will not be refreshed.",
            missing,
            tools.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tools_covers_every_step() {
        let tools = check_tools_with(|_| None);
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "glib-compile-schemas",
                "gtk-update-icon-cache",
                "update-mime-database",
                "update-desktop-database"
            ]
        );
        assert!(tools.iter().all(|t| !t.available));
    }

    #[test]
    fn test_render_plain_lines() {
        let tools = check_tools_with(|name| {
            (name == "update-mime-database").then(|| PathBuf::from("/usr/bin/update-mime-database"))
        });
        let text = render(&tools, false, false).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "✓ update-mime-database - found: /usr/bin/update-mime-database"
        );
        assert_eq!(
            lines[3],
            "✗ update-desktop-database - not found (provided by desktop-file-utils)"
        );
    }

    #[test]
    fn test_render_json() {
        let tools = check_tools_with(|name| {
            (name == "glib-compile-schemas").then(|| PathBuf::from("/usr/bin/glib-compile-schemas"))
        });
        let text = render(&tools, true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value[0]["available"], true);
        assert_eq!(value[0]["path"], "/usr/bin/glib-compile-schemas");
        assert_eq!(value[1]["available"], false);
        assert!(value[1].get("path").is_none());
    }
}
