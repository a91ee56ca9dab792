//! Compile Document Example
//!
//! This example compiles one page of a small in-memory project:
//! - Options are loaded from `stencil.yaml`
//! - Component descriptors come from a JSON feed
//! - Imports are resolved from `_Imports.stencil` files
//!
//! Run with `RUST_LOG=debug` to see every phase and pass.

use stencil_compiler::{CompilerOptions, Engine, ImportProvider, InMemoryProject, JsonProvider};

fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    println!("=== Stencil Compile Document Example ===\n");

    let options = CompilerOptions::from_yaml_str(include_str!("stencil.yaml"))?;
    let project = InMemoryProject::new(options.import_file_name.clone())
        .with_document("_Imports.stencil", include_str!("project/_Imports.stencil"))
        .with_document("Pages/Index.stencil", include_str!("project/Pages/Index.stencil"));

    let engine = Engine::builder()
        .with_default_features()
        .with_options(options)
        .with_provider(JsonProvider::new("descriptors.json", include_str!("descriptors.json")))
        .build()?;

    println!("Phases: {}", engine.phase_names().join(" -> "));
    println!("Descriptors:");
    for descriptor in engine.registry().descriptors() {
        println!("  {} ({})", descriptor.name(), descriptor.checksum());
    }

    for document in project.documents() {
        println!("\n--- {} ---", document.file_path);
        let imports = project.imports_for(&document.file_path);
        let output = engine.compile(document, imports)?;

        println!("Usings: {:?}", output.ir.usings);
        for diagnostic in &output.diagnostics {
            println!("  {}", diagnostic);
        }
        println!("{}", serde_json::to_string_pretty(&output.ir)?);

        if output.has_errors() {
            println!("✗ Compiled with errors");
        } else {
            println!("✓ Compiled");
        }
    }

    Ok(())
}
