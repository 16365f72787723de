//! Terminal presenter

use colored::{ColoredString, Colorize};

use crate::present::status::{Severity, StatusPresenter, StatusUpdate};

/// Prints status changes as colored lines on stdout
#[derive(Debug, Default)]
pub struct ConsolePresenter;

fn paint(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Pending => text.yellow(),
        Severity::Running => text.cyan(),
        Severity::Success => text.green().bold(),
        Severity::Error => text.red().bold(),
    }
}

impl StatusPresenter for ConsolePresenter {
    fn update(&self, update: StatusUpdate) {
        println!(
            "{:>15}: {}",
            update.element.label(),
            paint(&update.text, update.severity)
        );
    }

    fn notify(&self, message: &str) {
        println!();
        println!("{}", message);
        println!();
    }

    fn set_deploy_control(&self, enabled: bool, label: &str) {
        if enabled {
            println!("{}", format!("[{}]", label).bold());
        } else {
            println!("{}", format!("[{}]", label).dimmed());
        }
    }

    fn set_workflow_link(&self, url: &str) {
        println!("{:>15}: {}", "Workflow", url.underline());
    }
}
