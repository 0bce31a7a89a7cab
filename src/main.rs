// SPDX-License-Identifier: MPL-2.0
use magic_canvas::app::{batch, config, paths, BatchJob};
use magic_canvas::application::generation::Operation;
use magic_canvas::application::port::generation::{GenerationQuality, GenerationService};
use magic_canvas::domain::editing::ExportQuality;
use magic_canvas::infrastructure::HttpGenerationClient;
use magic_canvas::media::{Adjustments, ExportFormat};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
magic_canvas - headless generative photo editing

USAGE:
  magic_canvas [OPTIONS] <INPUT>

OPTIONS:
  -o, --output <PATH>        Output file (default: <INPUT stem>-edited.<ext>)
  --mask <PATH>              Mask image; opaque pixels mark the edit region
  --pose <PATH>              Reference image for pose transfer
  --op <NAME>                Operation: inpaint, magic-erase, expand, upscale,
                             remove-bg, restore, retouch, colorize, auto-enhance,
                             style:<preset>, relight:<direction>, pose, blur:<amount>
  --prompt <TEXT>            Prompt for inpaint
  --quality <low|medium|high>
  --warmth <N>               Warmth adjustment (-50 to 50)
  --exposure <N>             Exposure adjustment (-50 to 50)
  --saturation <N>           Saturation adjustment (-50 to 50)
  --accept                   Bake the generated result before exporting
  --format <png|jpeg|webp>   Export format (default: from output extension)
  --width <PX>               Export width
  --height <PX>              Export height
  --export-quality <1-100>   Quality for lossy formats
  --endpoint <URL>           Generation service endpoint
  --config-dir <PATH>        Directory holding settings.toml
  --log-level <LEVEL>        Log level when RUST_LOG is unset (default: info)
  -h, --help                 Print help
";

#[derive(Debug)]
struct Args {
    input: String,
    output: Option<String>,
    mask: Option<String>,
    pose: Option<String>,
    op: Option<String>,
    prompt: Option<String>,
    quality: Option<String>,
    warmth: i32,
    exposure: i32,
    saturation: i32,
    accept: bool,
    format: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    export_quality: Option<u8>,
    endpoint: Option<String>,
    config_dir: Option<String>,
    log_level: String,
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let parsed = Args {
        output: args.opt_value_from_str(["-o", "--output"])?,
        mask: args.opt_value_from_str("--mask")?,
        pose: args.opt_value_from_str("--pose")?,
        op: args.opt_value_from_str("--op")?,
        prompt: args.opt_value_from_str("--prompt")?,
        quality: args.opt_value_from_str("--quality")?,
        warmth: args.opt_value_from_str("--warmth")?.unwrap_or(0),
        exposure: args.opt_value_from_str("--exposure")?.unwrap_or(0),
        saturation: args.opt_value_from_str("--saturation")?.unwrap_or(0),
        accept: args.contains("--accept"),
        format: args.opt_value_from_str("--format")?,
        width: args.opt_value_from_str("--width")?,
        height: args.opt_value_from_str("--height")?,
        export_quality: args.opt_value_from_str("--export-quality")?,
        endpoint: args.opt_value_from_str("--endpoint")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        log_level: args
            .opt_value_from_str("--log-level")?
            .unwrap_or_else(|| "info".to_string()),
        input: args.free_from_str()?,
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        eprintln!("warning: ignoring unexpected arguments: {remaining:?}");
    }
    Ok(Some(parsed))
}

fn default_output(input: &str, format: ExportFormat) -> String {
    let path = std::path::Path::new(input);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("image");
    path.with_file_name(format!("{stem}-edited.{}", format.extension()))
        .to_string_lossy()
        .into_owned()
}

fn build_job(args: &Args, config: &config::Config) -> Result<BatchJob, String> {
    let format = match args.format.as_deref() {
        Some(name) => Some(
            ExportFormat::from_extension(name).ok_or_else(|| format!("unknown format `{name}`"))?,
        ),
        None => None,
    };
    let output = args.output.clone().unwrap_or_else(|| {
        default_output(&args.input, format.unwrap_or_else(|| config.export.format()))
    });

    let mut job = BatchJob::new(&args.input, output, config);
    job.mask = args.mask.as_ref().map(Into::into);
    job.pose_reference = args.pose.as_ref().map(Into::into);
    job.operation = match args.op.as_deref() {
        Some(name) => Some(
            Operation::parse(name, args.prompt.as_deref())
                .ok_or_else(|| format!("unknown operation `{name}`"))?,
        ),
        None => None,
    };
    if let Some(quality) = args.quality.as_deref() {
        job.quality = GenerationQuality::from_key(quality)
            .ok_or_else(|| format!("unknown quality `{quality}`"))?;
    }
    job.adjustments = Adjustments::new(args.warmth, args.exposure, args.saturation);
    job.accept = args.accept;
    job.format = format;
    job.width = args.width;
    job.height = args.height;
    if let Some(quality) = args.export_quality {
        job.export_quality = ExportQuality::new(quality);
    }
    Ok(job)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            return ExitCode::from(2);
        }
    };

    let log_filter = format!("magic_canvas={}", args.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    paths::init_cli_overrides(args.config_dir.clone());
    let (mut config, warning) = config::load();
    if let Some(warning) = warning {
        warn!("{warning}");
    }
    if let Some(endpoint) = &args.endpoint {
        config.generation.endpoint = Some(endpoint.clone());
    }

    let job = match build_job(&args, &config) {
        Ok(job) => job,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };

    let client = match config.generation.endpoint.as_deref() {
        Some(endpoint) if job.operation.is_some() => {
            match HttpGenerationClient::new(
                endpoint,
                config.generation.api_key(),
                config.generation.timeout(),
            ) {
                Ok(client) => Some(client),
                Err(err) => {
                    error!(%err, "generation client unavailable");
                    return ExitCode::FAILURE;
                }
            }
        }
        _ => None,
    };

    let service = client.as_ref().map(|client| client as &dyn GenerationService);
    match batch::run(&job, &config, service).await {
        Ok(report) => {
            info!(
                generated = report.generated,
                accepted = report.accepted,
                history = report.history_len,
                "done"
            );
            println!("{}", job.output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "edit failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
