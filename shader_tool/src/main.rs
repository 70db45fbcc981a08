//! `glata-shaders`: print, export or check the GLSL of a shader set

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use glata::foundation::logging;
use glata::prelude::*;

mod export;

fn main() -> Result<()> {
    logging::init();

    let matches = Command::new("glata-shaders")
        .about("Prints, exports or checks the GLSL generated for a shader set")
        .arg(
            Arg::new("config")
                .value_name("FILE")
                .help("Shader set (.toml or .ron); the built-in set when omitted"),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("DIR")
                .help("Write <name>.vert and <name>.frag into DIR instead of printing"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Initialize each shader without a GPU and compare lookups with declarations")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("write-default")
                .long("write-default")
                .value_name("FILE")
                .help("Save the built-in shader set to FILE and exit"),
        )
        .get_matches();

    if let Some(path) = matches.get_one::<String>("write-default") {
        ShaderSetConfig::default()
            .save_to_file(path)
            .with_context(|| format!("Failed to save default shader set to {path}"))?;
        log::info!("Default shader set written to {}", path);
        return Ok(());
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => ShaderSetConfig::load_from_file(path)
            .with_context(|| format!("Failed to load shader set from {path}"))?,
        None => ShaderSetConfig::default(),
    };
    config.validate()?;
    log::info!("Loaded {} shader(s)", config.shaders.len());

    if matches.get_flag("check") {
        let reports = export::check(&config)?;
        let mut dirty = 0;
        for report in &reports {
            if report.is_clean() {
                println!("ok    {}", report.name);
            } else {
                dirty += 1;
                println!(
                    "FAIL  {}: declared but never looked up {:?}, looked up but undeclared {:?}",
                    report.name, report.unqueried, report.undeclared
                );
            }
        }
        if dirty > 0 {
            anyhow::bail!("{dirty} of {} shader(s) failed the check", reports.len());
        }
        return Ok(());
    }

    let shaders = export::generate(&config);
    match matches.get_one::<String>("out") {
        Some(dir) => {
            let written = export::write_sources(&shaders, &PathBuf::from(dir))?;
            log::info!("Wrote {} file(s) to {}", written.len(), dir);
        }
        None => export::print_sources(&shaders),
    }
    Ok(())
}
