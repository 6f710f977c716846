use atty::Stream;
use color_eyre::Result;
use forkswap_core::{
    format_status_message, to_json_response, CommandGroup, CommandInfo, CommandStatus,
    ExecutionOutcome,
};
use serde_json::Value;

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = outcome.exit_code();
    let style = Style::new(opts.no_color, atty::is(Stream::Stdout));

    if opts.json {
        let payload = to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if let CommandStatus::Ok = outcome.status {
        if opts.quiet {
            return Ok(code);
        }
        let message = format_status_message(info, &outcome.message);
        println!("{}", style.status(&outcome.status, &message));
        for line in render_details(&style, info, &outcome.details) {
            println!("{line}");
        }
        if let Some(hint) = hint_from_details(&outcome.details) {
            println!("{}", style.info(&format!("Tip: {hint}")));
        }
    } else {
        // Errors print even under --quiet.
        let header = format!("{}  {}", error_code(info), outcome.message);
        println!("{}", style.error_header(&header));
        println!();
        println!("Why:");
        for reason in collect_why_bullets(&outcome.details, &outcome.message) {
            println!("  • {reason}");
        }
        let fixes = collect_fix_bullets(&outcome.details);
        if !fixes.is_empty() {
            println!();
            println!("Fix:");
            for fix in fixes {
                println!("{}", style.fix_bullet(&format!("  • {fix}")));
            }
        }
        if let Some(output) = installer_output(&outcome.details) {
            println!();
            println!("{}", style.table_header("Installer output:"));
            for line in output.lines() {
                println!("  {}", style.dimmed(line));
            }
        }
    }

    Ok(code)
}

fn error_code(info: CommandInfo) -> &'static str {
    match info.group {
        CommandGroup::Local => "FS101",
        CommandGroup::Official => "FS102",
        CommandGroup::Status => "FS103",
    }
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn installer_output(details: &Value) -> Option<&str> {
    details
        .get("output")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

fn render_details(style: &Style, info: CommandInfo, details: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(commands) = details.get("commands").and_then(Value::as_array) {
        for command in commands.iter().filter_map(Value::as_str) {
            lines.push(format!("  would run: {command}"));
        }
    }
    match info.group {
        CommandGroup::Official => lines.extend(render_manifest_changes(details)),
        CommandGroup::Status => {
            if let Some(table) = render_package_table(style, details) {
                lines.push(table);
            }
        }
        CommandGroup::Local => {}
    }
    if details.get("uninstall").and_then(|u| u.get("ok")) == Some(&Value::Bool(false)) {
        lines.push(style.dimmed("  nothing to uninstall beforehand"));
    }
    lines
}

fn render_manifest_changes(details: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(reports) = details.get("manifests").and_then(Value::as_array) else {
        return lines;
    };
    for report in reports {
        let path = report.get("path").and_then(Value::as_str).unwrap_or("?");
        let count = |key: &str| {
            report
                .get(key)
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };
        let (renamed, members, sources) = (
            count("renamed"),
            count("removed_members"),
            count("removed_sources"),
        );
        if renamed + members + sources == 0 {
            lines.push(format!("  {path}: already official"));
        } else {
            lines.push(format!(
                "  {path}: {renamed} requirement(s) renamed, {members} workspace member(s) and {sources} source(s) removed"
            ));
        }
    }
    lines
}

struct PackageRow {
    name: String,
    version: String,
    location: String,
}

fn render_package_table(style: &Style, details: &Value) -> Option<String> {
    let packages = details.get("packages")?.as_array()?;
    if packages.is_empty() {
        return None;
    }
    let mut rows = Vec::new();
    for pkg in packages {
        let obj = pkg.as_object()?;
        rows.push(PackageRow {
            name: obj.get("name")?.as_str()?.to_string(),
            version: obj.get("version")?.as_str()?.to_string(),
            location: obj
                .get("editable_project_location")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_string(),
        });
    }
    Some(format_package_table(style, &rows))
}

fn format_package_table(style: &Style, rows: &[PackageRow]) -> String {
    let headers = ["Package", "Version", "Editable location"];
    let mut widths = [headers[0].len(), headers[1].len(), headers[2].len()];
    for row in rows {
        widths[0] = widths[0].max(row.name.len());
        widths[1] = widths[1].max(row.version.len());
        widths[2] = widths[2].max(row.location.len());
    }

    let mut lines = Vec::new();
    lines.push(style.table_header(&format!(
        "{:<w0$}  {:<w1$}  {:<w2$}",
        headers[0],
        headers[1],
        headers[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    )));
    lines.push(format!(
        "{:-<w0$}  {:-<w1$}  {:-<w2$}",
        "",
        "",
        "",
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    ));
    for row in rows {
        lines.push(format!(
            "{:<w0$}  {:<w1$}  {:<w2$}",
            row.name,
            row.version,
            row.location,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        ));
    }
    lines.join("\n")
}

fn collect_why_bullets(details: &Value, fallback: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        push_unique(
            &mut bullets,
            reason_display(reason).unwrap_or(reason).to_string(),
        );
    }
    if let Some(issues) = details.get("issues").and_then(Value::as_array) {
        for message in issues.iter().filter_map(Value::as_str) {
            push_unique(&mut bullets, message);
        }
    }
    if bullets.is_empty() {
        push_unique(&mut bullets, fallback);
    }
    bullets
}

fn reason_display(reason: &str) -> Option<&'static str> {
    match reason {
        "installer_failed" => Some("The package installer reported an error"),
        "missing_local_checkout" => Some("The local fork checkout does not exist"),
        "invalid_config" => Some("The forkswap configuration is invalid"),
        "not_installed" => Some("The package cannot be imported"),
        _ => None,
    }
}

fn collect_fix_bullets(details: &Value) -> Vec<String> {
    let mut fixes = Vec::new();
    if let Some(hint) = hint_from_details(details) {
        push_unique(&mut fixes, hint);
    }
    if let Some(command) = details.get("command").and_then(Value::as_str) {
        push_unique(&mut fixes, format!("Re-run `{command}` by hand to see the full log"));
    }
    if fixes.is_empty() {
        fixes.push("Re-run with -v for more detail or --help for usage.".to_string());
    }
    fixes
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}
