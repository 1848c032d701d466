use clap::ArgMatches;
use tracing::{error, info};

use skald_core::config::configuration::Configuration;
use skald_core::config::plugins::ConfigPlugin;
use skald_core::config::types::{Priority, VarDecl, VarKind, Variable};
use skald_core::fmt::ansi::{AnsiLogger, LightColorUsage};
use skald_core::fmt::esc;
use skald_core::fmt::memory::MemoryLogger;
use skald_core::ini::plugin::IniFilePlugin;
use std::path::PathBuf;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("get", sub_matches)) => handle_get_command(sub_matches),
        Some(("set", sub_matches)) => handle_set_command(sub_matches),
        Some(("list", sub_matches)) => handle_list_command(sub_matches),
        Some(("check", sub_matches)) => handle_check_command(sub_matches),
        Some(("demo", sub_matches)) => handle_demo_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

fn ini_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .unwrap_or_else(|| IniFilePlugin::default_path("skald"))
}

fn defines(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("define")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Build the standard source chain: defaults, INI file, environment,
/// command-line definitions, protected values.
fn build_configuration(matches: &ArgMatches) -> Result<Configuration, Box<dyn std::error::Error>> {
    let path = ini_path(matches);
    let config = Configuration::with_default_plugins(defines(matches));
    config.insert_plugin(Box::new(IniFilePlugin::open(&path)?), Priority::File);
    Ok(config)
}

fn parse_kind(kind: &str) -> VarKind {
    match kind {
        "integer" => VarKind::Integer,
        "float" => VarKind::Float,
        "boolean" => VarKind::Boolean,
        "list" => VarKind::StringList,
        _ => VarKind::String,
    }
}

fn handle_get_command(sub_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let path = sub_matches
        .get_one::<String>("path")
        .ok_or("Path argument is required")?;
    let kind = parse_kind(sub_matches.get_one::<String>("kind").unwrap());

    let config = build_configuration(sub_matches)?;
    let resolved = config.load(&VarDecl::new(path, kind));

    info!(
        event = "cli.get.completed",
        path = %path,
        priority = %resolved.priority(),
    );

    if sub_matches.get_flag("json") {
        let response = serde_json::json!({
            "path": resolved.variable.path.to_string(),
            "defined": resolved.variable.is_defined(),
            "value": resolved.value.clone(),
            "values": resolved.variable.values.clone(),
            "priority": resolved.priority(),
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if resolved.priority() == Priority::None {
        println!("{path} is not defined");
    } else {
        println!("{path} = {} ({})", resolved.value, resolved.priority());
    }
    Ok(())
}

fn handle_set_command(sub_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let path = sub_matches
        .get_one::<String>("path")
        .ok_or("Path argument is required")?;
    let value = sub_matches
        .get_one::<String>("value")
        .ok_or("Value argument is required")?;

    let file = ini_path(sub_matches);
    let mut plugin = IniFilePlugin::open(&file)?;

    let decl = VarDecl::new(path, VarKind::String);
    let values = skald_core::ini::escape::split_values(value, decl.delim);
    let variable = Variable::new(decl.path.clone(), values, Priority::File);
    plugin.store(&variable);
    plugin.save()?;

    info!(
        event = "cli.set.completed",
        path = %path,
        file = %file.display(),
    );
    println!("{path} written to {}", file.display());
    Ok(())
}

fn handle_list_command(sub_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let section = sub_matches.get_one::<String>("section").unwrap();

    let config = build_configuration(sub_matches)?;
    let vars = config.section_vars(section);

    info!(event = "cli.list.completed", section = %section, count = vars.len());

    if sub_matches.get_flag("json") {
        let response: Vec<_> = vars
            .iter()
            .map(|v| {
                serde_json::json!({
                    "path": v.variable.path.to_string(),
                    "values": v.variable.values.clone(),
                    "priority": v.priority(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if vars.is_empty() {
        println!("no variables in section '{section}'");
        return Ok(());
    }

    // align columns through the formatter's auto-tab memory: one dry
    // run to learn the widths, then the printing run
    let mut logger = MemoryLogger::new();
    for _ in 0..2 {
        logger.clear();
        for v in &vars {
            logger.log(&format!(
                "{path} {tab}{value} {tab}{priority}",
                path = v.variable.path,
                value = v.variable.values.join(", "),
                priority = v.priority(),
                tab = esc::TAB,
            ));
        }
    }
    print!("{}", logger.buffer());
    Ok(())
}

fn handle_check_command(sub_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let path = ini_path(sub_matches);
    let doc = skald_core::ini::read_document(&path)?;

    if sub_matches.get_flag("json") {
        let response = serde_json::json!({
            "file": path.display().to_string(),
            "entries": doc.entry_count(),
            "diagnostics": doc.diagnostics.clone(),
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "{}: {} entries, {} diagnostics",
        path.display(),
        doc.entry_count(),
        doc.diagnostics.len()
    );
    for diagnostic in &doc.diagnostics {
        println!("  line {}: {:?}", diagnostic.line, diagnostic.kind);
    }
    Ok(())
}

fn handle_demo_command(sub_matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let lines = [
        format!(
            "net/listener {tab}{green}up {reset}{tab}bound to {cyan}0.0.0.0:8080{reset}",
            tab = esc::TAB,
            green = esc::GREEN,
            cyan = esc::CYAN,
            reset = esc::RESET,
        ),
        format!(
            "store {tab}{yellow}degraded {reset}{tab}compaction {bold}behind{reset}",
            tab = esc::TAB,
            yellow = esc::YELLOW,
            bold = esc::BOLD,
            reset = esc::RESET,
        ),
        format!(
            "auth {tab}{red}down {reset}{tab}see {url_s}https://status.example{url_e}",
            tab = esc::TAB,
            red = esc::RED,
            url_s = esc::URL_START,
            url_e = esc::URL_END,
            reset = esc::RESET,
        ),
    ];

    if sub_matches.get_flag("plain") {
        let mut logger = MemoryLogger::new();
        // two passes so every line aligns to the final tab stops
        for _ in 0..2 {
            logger.clear();
            for line in &lines {
                logger.log(line);
            }
        }
        print!("{}", logger.buffer());
        return Ok(());
    }

    let light = match sub_matches.get_one::<String>("light").unwrap().as_str() {
        "never" => LightColorUsage::Never,
        "background" => LightColorUsage::Background,
        _ => LightColorUsage::Foreground,
    };

    let mut logger = AnsiLogger::new(std::io::stdout());
    logger.set_light_colors(light);
    for line in &lines {
        logger.log(line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_cli;
    use tempfile::TempDir;

    fn matches_for(args: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn test_get_from_file_and_define() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.ini");
        std::fs::write(&file, "[NET]\nPORT= 8080\n").unwrap();
        let file_arg = file.to_string_lossy().to_string();

        let matches = matches_for(&["skald", "--file", &file_arg, "get", "NET/PORT"]);
        assert!(run_command(&matches).is_ok());

        let matches = matches_for(&[
            "skald",
            "--file",
            &file_arg,
            "-D",
            "--NET_PORT=9090",
            "get",
            "NET/PORT",
            "--json",
        ]);
        assert!(run_command(&matches).is_ok());
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.ini");
        let file_arg = file.to_string_lossy().to_string();

        let matches = matches_for(&["skald", "--file", &file_arg, "set", "LOG/LEVEL", "debug"]);
        run_command(&matches).unwrap();

        let written = std::fs::read_to_string(&file).unwrap();
        assert!(written.contains("[LOG]"));
        assert!(written.contains("LEVEL="));
    }

    #[test]
    fn test_check_reports_diagnostics() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.ini");
        std::fs::write(&file, "[Oops\n").unwrap();
        let file_arg = file.to_string_lossy().to_string();

        let matches = matches_for(&["skald", "--file", &file_arg, "check"]);
        assert!(run_command(&matches).is_ok());
    }

    #[test]
    fn test_demo_plain_runs() {
        let matches = matches_for(&["skald", "demo", "--plain"]);
        assert!(run_command(&matches).is_ok());
    }
}
