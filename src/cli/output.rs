//! Output formatting utilities

use clap::ValueEnum;
use console::{style, StyledObject};

use crate::cli::OutputFormat;
use crate::core::Config;
use crate::entities::Annotation;

/// Determine the effective output format based on context
///
/// An explicit `--format` wins, then the config default, then the command's
/// natural format (table for lists, YAML for nested results).
pub fn effective_format(format: OutputFormat, config: &Config, is_list: bool) -> OutputFormat {
    let configured = config
        .output
        .format
        .as_deref()
        .and_then(|name| OutputFormat::from_str(name, true).ok());

    match (format, configured) {
        (OutputFormat::Auto, Some(fmt)) if fmt != OutputFormat::Auto => fmt,
        (OutputFormat::Auto, _) => {
            if is_list {
                OutputFormat::Table
            } else {
                OutputFormat::Yaml
            }
        }
        (other, _) => other,
    }
}

/// Colorize an annotation label by severity
pub fn styled_annotation(annotation: Annotation) -> StyledObject<&'static str> {
    match annotation {
        Annotation::InControl => style(annotation.label()).green(),
        Annotation::OutOfControl => style(annotation.label()).yellow(),
        Annotation::OutOfSpec => style(annotation.label()).red(),
    }
}
