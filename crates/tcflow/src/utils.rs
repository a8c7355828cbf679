use colored::Colorize;
use std::io::Write;
use tcflow_cloud::{ActionType, ApplyResult, Plan};

/// Print a plan, one line per action
pub fn print_plan(plan: &Plan) {
    for action in &plan.actions {
        let line = match action.action_type {
            ActionType::Create => format!("  + {}", action.address).green(),
            ActionType::Update => format!("  ~ {}", action.address).yellow(),
            ActionType::Replace => format!("-/+ {}", action.address).magenta(),
            ActionType::Delete => format!("  - {}", action.address).red(),
            ActionType::NoOp => format!("    {}", action.address).dimmed(),
        };
        match &action.remote_id {
            Some(id) => println!("{} {}", line, format!("({})", id).dimmed()),
            None => println!("{}", line),
        }

        for key in ["changed", "force_new"] {
            if let Some(fields) = action.details.get(key).and_then(|v| v.as_array()) {
                let names: Vec<&str> = fields.iter().filter_map(|f| f.as_str()).collect();
                let label = if key == "force_new" {
                    "forces replacement"
                } else {
                    "changed"
                };
                println!("      {}: {}", label, names.join(", ").cyan());
            }
        }
        if action.details.contains_key("tainted") {
            println!("      {}", "tainted by a previous failed create".dimmed());
        }
    }
    println!();
    println!("Plan: {}", plan.summary());
}

/// Whether the plan would change anything
pub fn has_changes(plan: &Plan) -> bool {
    plan.actions
        .iter()
        .any(|a| a.action_type != ActionType::NoOp)
}

/// Ask for a y/N answer on stdin
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Print the outcome of an apply and fail if any action failed
pub fn report(result: &ApplyResult) -> anyhow::Result<()> {
    println!();
    for ok in &result.succeeded {
        println!("  {} {}", "✓".green(), ok.message);
    }
    for failed in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failed.action_id,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!();

    if result.is_success() {
        println!(
            "{}",
            format!(
                "✓ {} action(s) completed in {}ms",
                result.succeeded.len(),
                result.duration_ms
            )
            .green()
            .bold()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} action(s) failed",
            result.failed.len(),
            result.failed.len() + result.succeeded.len()
        )
    }
}
