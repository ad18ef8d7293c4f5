//! CLI logic for the Pantograph diagram inspector.
//!
//! Loads a persisted diagram file, validates it against the model
//! invariants, prints a summary, and optionally re-saves (normalizes) it.

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use pantograph::{Editor, PantographError};

/// Run the Pantograph CLI application
///
/// This function loads the input diagram through the persistence adapter
/// (which re-validates every model invariant), prints a summary to stdout,
/// and re-saves the diagram when an output path was given.
///
/// # Errors
///
/// Returns `PantographError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or invariant-violating diagram files
pub fn run(args: &Args) -> Result<(), PantographError> {
    info!(input_path = args.input; "Loading diagram");

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;
    let editor = Editor::from_xml(app_config, &source)?;

    let diagram = editor.diagram();
    println!(
        "{}: {} with {} node(s), {} relationship(s)",
        diagram.name(),
        diagram.kind(),
        diagram.nodes_count(),
        diagram.relationships_count(),
    );
    for node in diagram.nodes() {
        println!(
            "  {} `{}` at ({}, {})",
            node.kind(),
            node.name(),
            node.position().x(),
            node.position().y(),
        );
    }
    for relationship in diagram.relationships() {
        // Invariant: endpoints of a loaded diagram always resolve.
        if let Some((start, end)) = diagram.endpoint_names(relationship) {
            println!("  {} -> {} ({})", start, end, relationship.kind());
        }
    }

    let degenerate = diagram
        .relationships()
        .filter_map(|relationship| editor.connectors().geometry(relationship.id()))
        .filter(|geometry| geometry.is_degenerate())
        .count();
    if degenerate > 0 {
        warn!(count = degenerate; "relationships with coincident node centers");
    }

    if let Some(output) = &args.output {
        let xml = editor.to_xml()?;
        fs::write(output, xml)?;
        info!(output_file = output; "Diagram re-saved");
    }

    Ok(())
}
