//! Output formatting and reporting

use crate::OutputFormat;
use anyhow::Result;
use colored::*;
use remap_core::{ActionInfo, ActionSource, MappingResult, MappingStatus, Recommendation, Severity};

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    pub fn print_result(&self, result: &MappingResult, unresolved_only: bool) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_human_format(result, unresolved_only);
                Ok(())
            }
            OutputFormat::Json => self.print_json_format(result),
        }
    }

    fn print_human_format(&self, result: &MappingResult, unresolved_only: bool) {
        for (path, evaluation) in &result.evaluations {
            let needs_attention = matches!(
                evaluation.mapping_status,
                MappingStatus::Incompatible | MappingStatus::Warning
            );
            if unresolved_only && !needs_attention {
                continue;
            }

            println!(
                "{} {} [{}]",
                self.status_label(evaluation.mapping_status),
                path.bold(),
                format_action(result.actions.get(path))
            );

            for reason in &evaluation.reasons {
                let line = format!("{} ({})", reason.code, reason.message_key);
                let line = match reason.severity {
                    Severity::Error => line.red(),
                    Severity::Warning => line.yellow(),
                    Severity::Info => line.dimmed(),
                };
                println!("    {line}");
            }

            if let Some(recommendations) = result.recommendations.get(path) {
                for recommendation in recommendations {
                    println!("    suggest {}", format_recommendation(recommendation).cyan());
                }
            }
        }

        self.print_summary_human(result);
    }

    fn status_label(&self, status: MappingStatus) -> ColoredString {
        let label = match status {
            MappingStatus::Compatible => "compatible  ",
            MappingStatus::Solved => "solved      ",
            MappingStatus::Warning => "warning     ",
            MappingStatus::Incompatible => "incompatible",
        };
        if !self.use_colors {
            return label.normal();
        }
        match status {
            MappingStatus::Compatible => label.green(),
            MappingStatus::Solved => label.blue(),
            MappingStatus::Warning => label.yellow(),
            MappingStatus::Incompatible => label.red(),
        }
    }

    fn print_summary_human(&self, result: &MappingResult) {
        let summary = &result.summary;
        println!("\n{}", "Summary:".bold());
        println!("  Fields: {}", summary.total);
        println!("  Compatible: {}", summary.compatible.to_string().green());
        println!("  Warning: {}", summary.warning.to_string().yellow());
        println!("  Solved: {}", summary.solved.to_string().blue());
        println!("  Incompatible: {}", summary.incompatible.to_string().red());
        println!("  Completion: {:.1}%", summary.completion_percentage());
    }

    fn print_json_format(&self, result: &MappingResult) -> Result<()> {
        let mut value = serde_json::to_value(result)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "completionPercentage".to_string(),
                serde_json::json!(result.completion_percentage()),
            );
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}

fn format_action(info: Option<&ActionInfo>) -> String {
    let Some(info) = info else {
        return "no action info".to_string();
    };
    let Some(action) = info.action else {
        return "undecided".to_string();
    };

    let mut out = action.to_string();
    if let Some(other) = &info.other_value {
        out.push_str(&format!(" -> {other}"));
    }
    match info.source {
        ActionSource::Manual => {}
        ActionSource::Inherited => {
            let origin = info.inherited_from.as_deref().unwrap_or("?");
            out.push_str(&format!(", inherited from {origin}"));
        }
        ActionSource::SystemDefault => out.push_str(", default"),
    }
    out
}

fn format_recommendation(recommendation: &Recommendation) -> String {
    let action = recommendation
        .action
        .map(|a| a.to_string())
        .unwrap_or_default();
    match &recommendation.other_value {
        Some(other) => format!("{action} -> {other}"),
        None => action,
    }
}
