use std::{env, fs, process::ExitCode, str::FromStr};

use rbshim::{
    ArgSpec, GlobalResolver, MAX_OUTPUT_SLOTS, NoopTracer, Object, ObjectContext, RuntimeGlobal, ScanError, ScanOutput,
    ScanTracer, Scanner, ShimConfig, StderrTracer, StderrWarnings, Verbosity, WarningWriter, Warnings,
};
use serde_json::{Value as JsonValue, json};

const USAGE: &str = "usage: rbshim <format> [json-args] [--block] [--trace] [--verbose] [--config <file>]
       rbshim --global <rb_name> [--config <file>]";

/// Name of the proc passed as the block with `--block`.
const BLOCK_NAME: &str = "block";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("error: {err}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    let mut config = match load_config(cli.config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if cli.verbose {
        config.verbosity = Verbosity::Verbose;
    }

    let result = match &cli.global {
        Some(name) => resolve_global(&mut config, name),
        None => run_scan(&cli, &config),
    };
    match result {
        Ok(value) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    format: Option<String>,
    json_args: Option<String>,
    global: Option<String>,
    config_path: Option<String>,
    block: bool,
    trace: bool,
    verbose: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--block" => parsed.block = true,
                "--trace" => parsed.trace = true,
                "--verbose" => parsed.verbose = true,
                "--config" => parsed.config_path = Some(iter.next().ok_or("--config needs a file")?.clone()),
                "--global" => parsed.global = Some(iter.next().ok_or("--global needs a name")?.clone()),
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                positional => {
                    if parsed.format.is_none() {
                        parsed.format = Some(positional.to_owned());
                    } else if parsed.json_args.is_none() {
                        parsed.json_args = Some(positional.to_owned());
                    } else {
                        return Err(format!("unexpected argument {positional:?}"));
                    }
                }
            }
        }
        match (&parsed.format, &parsed.global) {
            (None, None) => Err("missing format".to_owned()),
            (Some(_), Some(_)) => Err("--global takes no format".to_owned()),
            _ => Ok(parsed),
        }
    }
}

fn load_config(path: Option<&str>) -> Result<ShimConfig, String> {
    let Some(path) = path else {
        return Ok(ShimConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|err| format!("error reading {path}: {err}"))?;
    ShimConfig::from_json(&text).map_err(|err| format!("error parsing {path}: {err}"))
}

fn resolve_global(config: &mut ShimConfig, name: &str) -> Result<JsonValue, String> {
    let global = RuntimeGlobal::from_str(name).map_err(|_| format!("unknown runtime global {name:?}"))?;
    let value = config.globals.resolve(global);
    Ok(json!({
        "global": global.to_string(),
        "variable": global.variable(),
        "value": value.to_json(),
    }))
}

/// Converts the JSON argument list into objects; no list means no arguments.
fn parse_args(text: Option<&str>) -> Result<Vec<Object>, String> {
    let Some(text) = text else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<JsonValue>(text) {
        Ok(JsonValue::Array(items)) => Ok(items.iter().map(Object::from_json).collect()),
        Ok(_) => Err("arguments must be a JSON array".to_owned()),
        Err(err) => Err(format!("invalid JSON arguments: {err}")),
    }
}

fn run_scan(cli: &CliArgs, config: &ShimConfig) -> Result<JsonValue, String> {
    let format = cli.format.as_deref().unwrap_or_default();
    let args = parse_args(cli.json_args.as_deref())?;
    let mut ctx = if cli.block {
        ObjectContext::with_block(Object::Proc(BLOCK_NAME.to_owned()))
    } else {
        ObjectContext::new()
    };
    let mut warnings = Warnings::new(config.verbosity, StderrWarnings);

    let result = if cli.trace {
        scan(
            Scanner::with_config(StderrTracer::new(), config),
            &mut ctx,
            &args,
            format,
            &mut warnings,
        )
    } else {
        scan(
            Scanner::with_config(NoopTracer, config),
            &mut ctx,
            &args,
            format,
            &mut warnings,
        )
    };
    result.map_err(|err| err.to_string())
}

fn scan<Tr: ScanTracer, W: WarningWriter>(
    mut scanner: Scanner<Tr>,
    ctx: &mut ObjectContext,
    args: &[Object],
    format: &str,
    warnings: &mut Warnings<W>,
) -> Result<JsonValue, ScanError> {
    let spec = scanner.spec(format)?;
    let output = scanner.bind(&spec, ctx, args)?;
    report_warnings(&spec, &output, args.len(), warnings);
    Ok(render(&spec, &output))
}

fn report_warnings<W: WarningWriter>(
    spec: &ArgSpec,
    output: &ScanOutput<Object>,
    passed: usize,
    warnings: &mut Warnings<W>,
) {
    let dropped = spec.slot_count().saturating_sub(MAX_OUTPUT_SLOTS);
    if dropped > 0 {
        warnings.warn(&format!(
            "format {spec} describes {} slots; the last {dropped} were dropped",
            spec.slot_count()
        ));
    }
    if spec.accepts_keywords && output.argc() == passed {
        warnings.warning(&format!("no keyword hash passed to {spec}; keyword slot is nil"));
    }
}

fn render(spec: &ArgSpec, output: &ScanOutput<Object>) -> JsonValue {
    let slots: Vec<JsonValue> = output
        .iter()
        .map(|(kind, value)| {
            json!({
                "kind": kind,
                "value": value.to_json(),
                "inspect": value.to_string(),
            })
        })
        .collect();
    json!({
        "format": spec.to_string(),
        "shape": spec,
        "min_args": spec.min_args(),
        "max_args": spec.max_args(),
        "slots": slots,
        "argc": output.argc(),
    })
}
