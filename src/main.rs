use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

use lang_generator::mt::GoogleTranslateProvider;
use lang_generator::{GenerateRequest, GeneratorConfig, LanguageGenerator};

fn cli() -> Command {
    Command::new("lang-generator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate language files for new locales with machine translation")
        .arg(
            Arg::new("from")
                .help("Source language code (e.g., en)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("to")
                .help("Target language codes (e.g., fr es de)")
                .required(true)
                .num_args(1..)
                .index(2),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .help("Translate only this file, relative to the source language directory"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Translate <lang-path>/<from>.json instead of the <from>/ directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lang-path")
                .long("lang-path")
                .short('l')
                .help("Root directory of the language files (default: lang)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to a TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Hide progress output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every translated string")
                .action(ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let verbose = matches.get_flag("verbose");
    let quiet = matches.get_flag("quiet");

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let request = GenerateRequest {
        from: matches
            .get_one::<String>("from")
            .cloned()
            .unwrap_or_default(),
        targets: matches
            .get_many::<String>("to")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        file: matches.get_one::<String>("file").cloned(),
        json: matches.get_flag("json"),
    };

    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let mut config = match GeneratorConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };
    if let Some(lang_path) = matches.get_one::<PathBuf>("lang-path") {
        config.lang_path = lang_path.clone();
    }

    let provider = match GoogleTranslateProvider::new(&config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("❌ Failed to initialize translator: {}", e);
            process::exit(1);
        }
    };

    let generator = LanguageGenerator::new(config, Arc::new(provider)).with_progress(!quiet);
    match generator.run(&request).await {
        Ok(_) => {
            if !quiet {
                println!("\n\n All files have been translated. \n");
            }
        }
        Err(e) => {
            eprintln!("\n❌ {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_cli_parses_multiple_targets_and_flags() {
        let matches = cli()
            .try_get_matches_from([
                "lang-generator",
                "en",
                "fr",
                "de",
                "--file",
                "auth.php",
                "--json",
                "--lang-path",
                "resources/lang",
            ])
            .unwrap();

        let targets: Vec<&String> = matches.get_many::<String>("to").unwrap().collect();
        assert_eq!(targets, vec!["fr", "de"]);
        assert_eq!(matches.get_one::<String>("file").unwrap(), "auth.php");
        assert!(matches.get_flag("json"));
        assert_eq!(
            matches.get_one::<PathBuf>("lang-path").unwrap(),
            &PathBuf::from("resources/lang")
        );
    }

    #[test]
    fn test_cli_requires_a_target() {
        assert!(cli().try_get_matches_from(["lang-generator", "en"]).is_err());
    }
}
