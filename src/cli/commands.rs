use crate::{
    cli::args::{GenerateArgs, MatrixArgs, RunArgs, ValidateArgs},
    core::{
        config::loader::CONFIG_FILE_NAME, default_chain, ActionsConfig, AppError, ConfigLoader,
        ConfigValidator, Decoder, ErrorCategory, GeneratorConfig, Resource, ResourceObject,
        Scheme, WorkflowGenerator,
    },
    fetcher::{parse_sources, Fetcher},
    Result,
};
use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

/// Explicit `--config`, else `./loom-actions.toml` when it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidate = PathBuf::from(CONFIG_FILE_NAME);
    candidate.exists().then_some(candidate)
}

pub fn load_config(explicit: Option<&Path>) -> Result<ActionsConfig> {
    let config = match explicit {
        Some(path) => ConfigLoader::load_explicit(path)?,
        None => ConfigLoader::load_from_dir(Path::new("."))?,
    };
    ConfigValidator::validate(&config)?;
    Ok(config)
}

/// Parse `KEY1=val1; KEY2=val2`. Entries without `=` are ignored; keys and values are trimmed.
pub fn parse_pipeline_vars(raw: Option<&str>) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();
    let Some(raw) = raw else {
        return vars;
    };
    for pair in raw.split(';').map(str::trim) {
        if let Some((key, value)) = pair.split_once('=') {
            vars.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    vars
}

/// Read files in order and join them into one multi-document stream.
pub fn load_yaml_files(paths: &[PathBuf]) -> Result<String> {
    let mut contents = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.exists() {
            return Err(AppError::new(
                ErrorCategory::IoError,
                format!("File not found: {}", path.display()),
            )
            .with_context("path", path.display().to_string())
            .into());
        }
        let text = fs::read_to_string(path).map_err(AppError::from)?;
        contents.push(text);
    }
    Ok(contents.join(crate::fetcher::DOCUMENT_SEPARATOR))
}

fn decode_resources(text: &str) -> Result<Vec<Resource>> {
    let scheme = Scheme::with_v1_types();
    let resources = Decoder::new(&scheme)
        .decode_all(text)
        .map_err(AppError::from)?;
    if resources.is_empty() {
        return Err(anyhow!("No resources found in input"));
    }
    Ok(resources)
}

/// Log every finding. Errors block unless `force` is set.
fn check_resources(resources: &[Resource], force: bool) -> Result<()> {
    let chain = default_chain();
    let mut has_errors = false;

    for resource in resources {
        let result = chain.validate(resource);
        for warning in &result.warnings {
            tracing::warn!("{}", warning);
        }
        if !result.valid {
            for error in &result.errors {
                tracing::error!("{}", error);
            }
            has_errors = true;
        }
    }

    if has_errors {
        if !force {
            return Err(anyhow!("Validation failed. Use --force to generate anyway."));
        }
        tracing::warn!("validation errors ignored because --force was given");
    }
    Ok(())
}

fn generator_config(config: &ActionsConfig, default_runner: Option<String>) -> GeneratorConfig {
    let mut generator = config.generator.clone();
    if let Some(runner) = default_runner {
        generator.default_runner = runner;
    }
    generator
}

fn write_output(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Generated: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

async fn fetch_sources(raw: &str, token: Option<&str>, config: &ActionsConfig) -> Result<String> {
    let sources = parse_sources(raw);
    if sources.is_empty() {
        return Err(anyhow!("No sources provided"));
    }
    tracing::info!("sources ({}):", sources.len());
    for source in &sources {
        tracing::info!("  - {}", source);
    }

    let fetcher = Fetcher::new(Duration::from_secs(config.fetch.timeout_seconds))
        .map_err(AppError::from)?;
    let text = fetcher
        .fetch_all(&sources, token)
        .await
        .map_err(AppError::from)?;
    Ok(text)
}

pub fn generate(args: GenerateArgs, config: ActionsConfig) -> Result<()> {
    let text = load_yaml_files(&args.input_files)?;
    let resources = decode_resources(&text)?;
    check_resources(&resources, args.force)?;

    let mut generator = WorkflowGenerator::new(generator_config(&config, args.default_runner));
    generator.add_resources(resources);
    let output = generator.generate_text().map_err(AppError::from)?;
    write_output(&output, args.output.as_deref())
}

pub fn validate(args: ValidateArgs) -> Result<()> {
    let text = load_yaml_files(&args.input_files)?;
    let resources = decode_resources(&text)?;
    let chain = default_chain();
    let mut error_count = 0;

    for resource in &resources {
        tracing::info!(
            "Validating: {}/{}",
            resource.api_version(),
            resource.kind()
        );
        let result = chain.validate(resource);
        for warning in &result.warnings {
            tracing::warn!("  {}", warning);
        }
        if result.valid {
            tracing::info!("  valid");
        } else {
            for error in &result.errors {
                tracing::error!("  {}", error);
            }
            error_count += result.errors.len();
        }
    }

    if error_count > 0 {
        return Err(anyhow!("validation failed with {} error(s)", error_count));
    }
    Ok(())
}

pub async fn run(args: RunArgs, config: ActionsConfig) -> Result<()> {
    let default_runner = args
        .default_runner
        .as_deref()
        .unwrap_or(&config.generator.default_runner);
    tracing::info!("token:          {}", if args.token.is_some() { "***" } else { "<not set>" });
    tracing::info!(
        "output:         {}",
        args.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdout>".to_string())
    );
    tracing::info!("default-runner: {}", default_runner);
    tracing::info!("force:          {}", args.force);

    let extra_vars = parse_pipeline_vars(args.pipeline_vars.as_deref());
    for (key, value) in &extra_vars {
        tracing::info!("  var {} = {}", key, value);
    }

    let text = fetch_sources(&args.sources, args.token.as_deref(), &config).await?;
    let resources = decode_resources(&text)?;
    check_resources(&resources, args.force)?;

    let mut generator = WorkflowGenerator::new(generator_config(&config, args.default_runner));
    generator.add_resources(resources);
    generator.add_extra_vars(extra_vars);
    let output = generator.generate_text().map_err(AppError::from)?;
    write_output(&output, args.output.as_deref())
}

pub async fn generate_matrix(args: MatrixArgs, config: ActionsConfig) -> Result<()> {
    let text = fetch_sources(&args.sources, args.token.as_deref(), &config).await?;
    let resources = decode_resources(&text)?;
    check_resources(&resources, args.force)?;

    let mut generator = WorkflowGenerator::new(config.generator.clone());
    generator.add_resources(resources);
    generator.add_extra_vars(parse_pipeline_vars(args.pipeline_vars.as_deref()));
    let document = generator.generate().map_err(AppError::from)?;
    let matrix = document.matrix().map_err(AppError::from)?;
    write_output(&serde_json::to_string(&matrix)?, None)
}

pub fn list_types() -> Result<()> {
    let mut known = Scheme::with_v1_types().known_types();
    known.sort();
    for version_kind in known {
        println!("{}", version_kind);
    }
    Ok(())
}
