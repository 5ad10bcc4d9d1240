//! # Cascade CLI Application
//!
//! Terminal front-end for the conveyance engine: designs a stilling basin
//! from prompted inputs, then lays out a small demo network.
//!
//! Logging goes to stderr; set `RUST_LOG` (e.g. `RUST_LOG=hydro_core=debug`)
//! to change the level.

use std::io::{self, BufRead, Write};

use hydro_core::basin::{design_basin, BasinDesignInput, BasinDesignResult};
use hydro_core::elements::{Chute, CrossSection, Transition};
use hydro_core::project::Project;
use hydro_core::HydroResult;
use tracing_subscriber::EnvFilter;

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    println!("Cascade CLI - Chute and Stilling Basin Designer");
    println!("===============================================");
    println!();

    let discharge = prompt_f64("Enter design discharge Q (m³/s) [5.0]: ", 5.0);
    let width = prompt_f64("Enter chute width b (m) [2.0]: ", 2.0);
    let drop = prompt_f64("Enter total drop H (m) [10.0]: ", 10.0);
    let tailwater = prompt_f64("Enter tailwater depth (m) [0.0]: ", 0.0);

    println!();

    let input = BasinDesignInput::new(discharge, width, drop).with_tailwater(tailwater);
    match design_basin(&input) {
        Ok(result) => {
            print_basin_report(&input, &result);

            println!();
            println!("JSON Output:");
            if let Ok(json) = serde_json::to_string_pretty(&result) {
                println!("{}", json);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            return;
        }
    }

    println!();
    if let Err(e) = run_network_demo(discharge) {
        tracing::error!("network demo failed: {}", e);
    }
}

fn print_basin_report(input: &BasinDesignInput, result: &BasinDesignResult) {
    let config = &result.config;

    println!("═══════════════════════════════════════");
    println!("  STILLING BASIN DESIGN");
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  Discharge: {:.2} m³/s", input.discharge);
    println!("  Width:     {:.2} m", input.width);
    println!("  Drop:      {:.2} m", input.drop);
    println!("  Tailwater: {:.2} m", input.tailwater_depth);
    println!();
    println!("Hydraulics:");
    println!("  V1 = {:.2} m/s", result.outlet_velocity);
    println!("  d1 = {:.3} m", result.supercritical_depth);
    println!("  Fr = {:.2} ({:?} jump)", result.froude_number, result.jump_type);
    println!("  d2 = {:.3} m", result.conjugate_depth);
    println!(
        "  ΔE = {:.2} m ({:.0}% dissipated)",
        result.energy_loss,
        result.efficiency * 100.0
    );
    println!();
    println!("Basin: {} - {}", config.basin_type.code(), config.basin_type.description());
    println!("  Length: {:.2} m", config.length);
    println!("  Depth:  {:.2} m", config.depth);
    if let Some(blocks) = &config.chute_blocks {
        println!(
            "  Chute blocks:  {} x {:.3} m (spacing {:.3} m)",
            blocks.count, blocks.height, blocks.spacing
        );
    }
    if let Some(baffles) = &config.baffle_blocks {
        println!(
            "  Baffle blocks: {} row(s) x {} at {:.2} m",
            baffles.rows, baffles.blocks_per_row, baffles.distance_from_inlet
        );
    }
    if let Some(sill) = &config.end_sill {
        println!("  End sill:      {:?}, {:.3} m high", sill.sill_type, sill.height);
    }
    println!("  Apron:  {:.2} m", result.apron_length);
    println!();

    if result.warnings.is_empty() {
        println!("  {} No warnings", status_icon(true));
    } else {
        for warning in &result.warnings {
            println!("  {} {}", status_icon(false), warning);
        }
    }
    println!("═══════════════════════════════════════");
}

/// Channel -> transition -> chute, laid out from station 0.
fn run_network_demo(discharge: f64) -> HydroResult<()> {
    let mut project = Project::new("CLI", "DEMO", "Cascade");
    project.settings.auto_design_basin = true;
    project.settings.design_discharge = Some(discharge);

    let channel = project.settings.channel("CH-1", 50.0, CrossSection::rectangular(2.5, 1.2), 0.01);
    let channel = project.add_element(channel)?;

    let transition = Transition::new(
        4.0,
        CrossSection::rectangular(2.5, 1.2),
        CrossSection::rectangular(2.0, 1.0),
    );
    let transition = project.add_element(hydro_core::HydraulicElement::transition(
        "TR-1",
        transition,
        project.settings.manning_n,
        0.005,
    ))?;

    let chute = project.settings.chute("R-1", Chute::new(20.0, 10.0, 2.0, 1.0).with_inlet(1.0, 0.0));
    let chute = project.add_element(chute)?;

    project.connect(channel, transition)?;
    project.connect(transition, chute)?;
    project.design_basin(chute, discharge)?;

    println!("Demo network:");
    println!("  {:<6} {:<11} {:>9} {:>9} {:>9} {:>9}", "Label", "Type", "Sta In", "El In", "Sta Out", "El Out");
    for id in project.network.chain_from(channel) {
        if let Some(el) = project.network.get(id) {
            let p = el.placement;
            println!(
                "  {:<6} {:<11} {:>9.2} {:>9.3} {:>9.2} {:>9.3}",
                el.label,
                el.kind.name(),
                p.start_station,
                p.start_elevation,
                p.end_station,
                p.end_elevation
            );
        }
    }

    if let Some(basin) = project.network.get(chute).and_then(|e| e.as_chute()).and_then(|c| c.stilling_basin.as_ref()) {
        let volume = basin.concrete_volume(2.0, basin.depth + project.settings.free_board, project.settings.wall_thickness);
        println!();
        println!(
            "  Basin at R-1: {} x {:.2} m, concrete ≈ {:.1} m³",
            basin.basin_type.code(),
            basin.length,
            volume
        );
    }

    Ok(())
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[WARN]" }
}
