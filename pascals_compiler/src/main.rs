use pascals_compiler::config::runtime::RuntimeConfig;
use pascals_compiler::logging::{codes, LogLevel};
use pascals_compiler::utils::SourceMap;
use pascals_compiler::{logging, pipeline};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    input: Option<String>,
    tokens: bool,
    parse_tree: bool,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("pascals_compiler");

    let options = match parse_args(&args[1.min(args.len())..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <file.pas> [options]", program_name);
            eprintln!("       {} --help", program_name);
            std::process::exit(1);
        }
    };

    if options.help {
        print_help(program_name);
        return Ok(());
    }

    let runtime_config = match &options.config {
        Some(path) => match RuntimeConfig::load_from_file(path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
        },
        None => RuntimeConfig::default(),
    };

    logging::config::init_runtime_preferences(runtime_config.logging.clone())?;
    logging::init_global_logging()?;
    if let Err(message) = pipeline::validate_pipeline() {
        logging::safe_log_error(codes::system::INITIALIZATION_FAILURE, &message);
        std::process::exit(1);
    }

    let Some(input) = options.input.as_deref() else {
        eprintln!("Error: no input file given");
        std::process::exit(1);
    };

    if let Err(error) = run(input, &options, &runtime_config) {
        report_failure(input, &error);
        finish();
        std::process::exit(1);
    }

    finish();
    Ok(())
}

fn report_failure(input: &str, error: &pipeline::PipelineError) {
    eprintln!("\nFAILED in {} [{}]", error.stage(), error.error_code());
    match (error.span(), fs::read_to_string(input)) {
        (Some(span), Ok(source)) => {
            eprint!(
                "{}",
                SourceMap::new(source).format_error(&span, &error.detailed_message())
            );
        }
        _ => eprintln!("{}", error.detailed_message()),
    }
}

fn finish() {
    logging::print_cargo_style_summary();

    let summary = logging::get_processing_summary();
    if summary.has_errors() || summary.has_warnings() {
        eprintln!(
            "{} error(s), {} warning(s)",
            summary.total_errors, summary.total_warnings
        );
    }

    if logging::config::get_min_log_level() >= LogLevel::Debug {
        eprintln!("{}", logging::get_system_diagnostics());
    }
}

fn run(
    input: &str,
    options: &CliOptions,
    config: &RuntimeConfig,
) -> Result<(), pipeline::PipelineError> {
    if options.tokens {
        let result = pipeline::scan_file(input, config)?;
        let dump = result.render();
        print!("{}", dump);
        if let Some(path) = &options.output {
            pipeline::write_output(path, &dump)?;
        }
        if result.has_lexical_errors() {
            eprintln!(
                "\n{} unrecognized character(s) in {}",
                result.metrics.invalid_chars, input
            );
        }
        return Ok(());
    }

    if options.parse_tree {
        let result = pipeline::parse_file(input, config)?;
        let dump = result.render();
        print!("{}", dump);
        if let Some(path) = &options.output {
            pipeline::write_output(path, &dump)?;
        }
        return Ok(());
    }

    let result = pipeline::compile_file(input, config)?;
    let report = result.render();
    print!("{}", report);

    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| pipeline::default_output_path(Path::new(input)));
    pipeline::write_output(&output_path, &report)?;
    println!("\nOutput written to {}", output_path.display());
    Ok(())
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.help = true,
            "--tokens" => options.tokens = true,
            "--parse-tree" => options.parse_tree = true,
            "--output" | "-o" => {
                i += 1;
                let path = args.get(i).ok_or("--output requires a path")?;
                options.output = Some(PathBuf::from(path));
            }
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a path")?;
                options.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option '{}'", flag));
            }
            input => {
                if options.input.is_some() {
                    return Err(format!("unexpected extra argument '{}'", input));
                }
                options.input = Some(input.to_string());
            }
        }
        i += 1;
    }

    if options.tokens && options.parse_tree {
        return Err("--tokens and --parse-tree cannot be combined".to_string());
    }
    if options.input.is_none() && !options.help {
        return Err("missing input file".to_string());
    }

    Ok(options)
}

fn print_help(program_name: &str) {
    println!("Pascal-S compiler front end v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("    {} <file.pas> [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --tokens          Stop after scanning and print one token per line");
    println!("    --parse-tree      Stop after parsing and print the parse tree");
    println!("    --output PATH     Write the report to PATH instead of <file>.out");
    println!("    --config PATH     Load runtime preferences from a TOML file");
    println!("    --help            Show this help message");
    println!();
    println!("OUTPUT:");
    println!("    Decorated AST followed by the TAB, BTAB and ATAB dumps");
    println!();
    println!("ENVIRONMENT:");
    println!("    PASCALS_SEMANTIC_REDECLARATION_POLICY   strict | lenient");
    println!("    PASCALS_LOGGING_MIN_LEVEL               error | warning | info | debug");
    println!("    PASCALS_LEXICAL_DFA_RULES               path to a DFA rules JSON file");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_full_options() {
        let options = parse_args(&args(&[
            "hello.pas",
            "--output",
            "out/hello.txt",
            "--config",
            "prefs.toml",
        ]))
        .unwrap();

        assert_eq!(options.input.as_deref(), Some("hello.pas"));
        assert_eq!(options.output, Some(PathBuf::from("out/hello.txt")));
        assert_eq!(options.config, Some(PathBuf::from("prefs.toml")));
        assert!(!options.tokens);
        assert!(!options.parse_tree);
    }

    #[test]
    fn test_parse_stage_flags() {
        let options = parse_args(&args(&["--tokens", "a.pas"])).unwrap();
        assert!(options.tokens);

        let options = parse_args(&args(&["a.pas", "--parse-tree"])).unwrap();
        assert!(options.parse_tree);

        assert!(parse_args(&args(&["a.pas", "--tokens", "--parse-tree"])).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.pas", "--output"])).is_err());
        assert!(parse_args(&args(&["a.pas", "--verbose"])).is_err());
        assert!(parse_args(&args(&["a.pas", "b.pas"])).is_err());
    }

    #[test]
    fn test_help_needs_no_input() {
        let options = parse_args(&args(&["--help"])).unwrap();
        assert!(options.help);
        assert!(options.input.is_none());
    }
}
