use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("skald")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and edit layered configuration variables")
        .long_about(
            "skald resolves configuration variables across prioritized sources \
            (in-code defaults, an INI file, environment variables, command-line \
            definitions and protected values) and renders aligned, colorized \
            output through its own escape-code formatter.",
        )
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .help("INI file to use (default: ~/.skald/skald.ini)")
                .global(true),
        )
        .arg(
            Arg::new("define")
                .long("define")
                .short('D')
                .help("Variable definition token, e.g. -D --SECTION_NAME=value")
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only emit error-level log events")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("get")
                .about("Resolve a variable through the source chain")
                .arg(
                    Arg::new("path")
                        .help("Variable path, e.g. NET/PORT or net.port")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .short('k')
                        .help("Expected kind")
                        .value_parser(["string", "integer", "float", "boolean", "list"])
                        .default_value("string"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Write a variable to the INI file")
                .arg(
                    Arg::new("path")
                        .help("Variable path, e.g. NET/PORT")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("value")
                        .help("Externalized value; lists use the delimiter, e.g. 'a, b'")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List all variables of a section across sources")
                .arg(
                    Arg::new("section")
                        .long("section")
                        .short('s')
                        .help("Section name (default: the unnamed top-level section)")
                        .default_value(""),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse the INI file and report per-line diagnostics")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Render sample escape-coded log lines")
                .arg(
                    Arg::new("plain")
                        .long("plain")
                        .help("Prune escape codes instead of translating to ANSI")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("light")
                        .long("light")
                        .help("Light color placement")
                        .value_parser(["never", "foreground", "background"])
                        .default_value("foreground"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_structure() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_get_parses() {
        let matches = build_cli()
            .try_get_matches_from(["skald", "get", "NET/PORT", "--json"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "get");
        assert_eq!(sub.get_one::<String>("path").unwrap(), "NET/PORT");
        assert!(sub.get_flag("json"));
    }

    #[test]
    fn test_defines_accumulate() {
        let matches = build_cli()
            .try_get_matches_from([
                "skald",
                "-D",
                "--A_B=1",
                "-D",
                "--C_D=2",
                "get",
                "A/B",
            ])
            .unwrap();
        let defines: Vec<_> = matches.get_many::<String>("define").unwrap().collect();
        assert_eq!(defines.len(), 2);
    }
}
