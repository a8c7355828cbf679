use crate::workspace;
use colored::Colorize;
use tcflow_cloud::{Context, Engine, Schema};

pub fn handle(resource_type: Option<&str>) -> anyhow::Result<()> {
    let provider = workspace::offline_provider()?;
    let engine = Engine::new(&provider, Context::new());

    let Some(name) = resource_type else {
        println!("{}", "Resources:".bold());
        for name in engine.resource_types() {
            println!("  {}", name.cyan());
        }
        println!("{}", "Data sources:".bold());
        for name in engine.data_source_types() {
            println!("  {}", name.cyan());
        }
        return Ok(());
    };

    if let Ok(resource) = engine.resource(name) {
        print_schema(name, "resource", resource.schema());
        if resource.id_segments() > 1 {
            println!();
            println!(
                "{}",
                format!(
                    "Import ID: {} `#`-separated segments",
                    resource.id_segments()
                )
                .dimmed()
            );
        }
        return Ok(());
    }
    if let Ok(source) = engine.data_source(name) {
        print_schema(name, "data source", source.schema());
        return Ok(());
    }

    anyhow::bail!(
        "unknown type `{}` (run `tcflow schema` to list the available types)",
        name
    )
}

fn print_schema(name: &str, kind: &str, schema: &Schema) {
    println!("{} {}", name.cyan().bold(), format!("({})", kind).dimmed());
    println!("{}", schema.description);
    println!();

    for field in schema.fields.values() {
        let mut flags = Vec::new();
        if field.required {
            flags.push("required");
        } else if field.optional {
            flags.push("optional");
        }
        if field.computed {
            flags.push("computed");
        }
        if field.force_new {
            flags.push("force new");
        }
        if field.sensitive {
            flags.push("sensitive");
        }

        let mut line = format!(
            "  {:<28} {:<14} {}",
            field.name,
            field.field_type.to_string(),
            flags.join(", ")
        );
        if let Some(default) = &field.default {
            line.push_str(&format!(" (default {})", default));
        }
        println!("{}", line);
        if !field.description.is_empty() {
            println!("      {}", field.description.dimmed());
        }
    }
}
