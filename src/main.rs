// SPDX-License-Identifier: MPL-2.0
use launcher_l10n::catalog::ts;
use launcher_l10n::config;
use launcher_l10n::error::Error;
use launcher_l10n::i18n::Translator;
use launcher_l10n::placeholder;
use launcher_l10n::validate::{self, Severity};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

const HELP: &str = "\
launcher-l10n - inspect and query launcher translation catalogs

USAGE:
  launcher-l10n [--config-dir DIR] <COMMAND>

COMMANDS:
  tr [--lang L] [--comment C] [--plain] <CONTEXT> <SOURCE> [ARGS...]
                      Print the localized string, filling %1, %2, ... with ARGS
  list [--lang L]     Print what each entry of the selected catalog resolves to
  locales             Print available locales (current one marked with *)
  check <FILE.ts>...  Validate TS files; exits with 1 on errors
  fmt <FILE.ts>       Re-emit a TS file in canonical layout

Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.
";

#[derive(Debug)]
enum CliError {
    Args(pico_args::Error),
    Usage(String),
    Lib(Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Args(e) => write!(f, "{}", e),
            CliError::Usage(e) => write!(f, "{}", e),
            CliError::Lib(e) => write!(f, "{}", e),
        }
    }
}

impl From<pico_args::Error> for CliError {
    fn from(err: pico_args::Error) -> Self {
        CliError::Args(err)
    }
}

impl From<Error> for CliError {
    fn from(err: Error) -> Self {
        CliError::Lib(err)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(pico_args::Arguments::from_env()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!();
            eprint!("{}", HELP);
            ExitCode::from(2)
        }
    }
}

fn run(mut args: pico_args::Arguments) -> Result<ExitCode, CliError> {
    if args.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(ExitCode::SUCCESS);
    }

    let config_dir: Option<PathBuf> = args.opt_value_from_str("--config-dir")?;
    let (config, warning) = config::load_with_override(config_dir);
    if let Some(warning) = warning {
        tracing::warn!("{}", warning);
    }

    let Some(command) = args.subcommand()? else {
        return Err(CliError::Usage("missing command".to_string()));
    };

    match command.as_str() {
        "tr" => {
            let lang: Option<String> = args.opt_value_from_str("--lang")?;
            let comment: Option<String> = args.opt_value_from_str("--comment")?;
            let plain = args.contains("--plain");
            let context: String = args.free_from_str()?;
            let source: String = args.free_from_str()?;
            let values = into_strings(args.finish())?;

            let mut translator = Translator::new(None, &config);
            if let Some(lang) = lang {
                translator.select(&lang)?;
            }
            let text = translator.tr_with_comment(&context, &source, comment.as_deref().unwrap_or(""));
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            let mut text = placeholder::format(&text, &values);
            if plain {
                text = placeholder::strip_mnemonic(&text);
            }
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        "list" => {
            let lang: Option<String> = args.opt_value_from_str("--lang")?;
            ensure_no_extra(args)?;

            let mut translator = Translator::new(None, &config);
            if let Some(lang) = lang {
                translator.select(&lang)?;
            }
            match translator.current_catalog() {
                Some(catalog) => {
                    for (context, message) in catalog.messages() {
                        if message.status.is_retired() {
                            continue;
                        }
                        let shown = message.usable_text().unwrap_or(message.source.as_str());
                        println!("{} / {} → {}", context, message.source, shown);
                    }
                }
                None => tracing::info!(
                    locale = %translator.current_locale(),
                    "source locale selected; nothing to list"
                ),
            }
            Ok(ExitCode::SUCCESS)
        }
        "locales" => {
            ensure_no_extra(args)?;
            let translator = Translator::new(None, &config);
            for locale in translator.available_locales() {
                let marker = if locale == translator.current_locale() { "*" } else { " " };
                println!("{} {}", marker, locale);
            }
            Ok(ExitCode::SUCCESS)
        }
        "check" => {
            let files = into_strings(args.finish())?;
            if files.is_empty() {
                return Err(CliError::Usage("check needs at least one file".to_string()));
            }
            let mut failed = false;
            for file in files {
                failed |= !check_file(&file);
            }
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        "fmt" => {
            let file: PathBuf = args.free_from_str()?;
            ensure_no_extra(args)?;
            let catalog = ts::parse_file(&file)?;
            print!("{}", ts::to_string(&catalog)?);
            Ok(ExitCode::SUCCESS)
        }
        other => Err(CliError::Usage(format!("unknown command '{}'", other))),
    }
}

/// Prints the issues of one file. Returns `false` on parse failure or errors.
fn check_file(file: &str) -> bool {
    let catalog = match ts::parse_file(file.as_ref()) {
        Ok(catalog) => catalog,
        Err(err) => {
            println!("{}: {}", file, err);
            return false;
        }
    };

    let issues = validate::validate(&catalog);
    for issue in &issues {
        println!("{}: {}", file, issue);
    }
    let errors = issues
        .iter()
        .filter(|issue| issue.severity() == Severity::Error)
        .count();
    println!(
        "{}: {} messages, {} errors, {} warnings",
        file,
        catalog.len(),
        errors,
        issues.len() - errors
    );
    validate::is_clean(&issues)
}

fn into_strings(values: Vec<OsString>) -> Result<Vec<String>, CliError> {
    values
        .into_iter()
        .map(|value| {
            value
                .into_string()
                .map_err(|raw| CliError::Usage(format!("argument is not UTF-8: {:?}", raw)))
        })
        .collect()
}

fn ensure_no_extra(args: pico_args::Arguments) -> Result<(), CliError> {
    let rest = args.finish();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CliError::Usage(format!("unexpected arguments: {:?}", rest)))
    }
}
