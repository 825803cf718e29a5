//! solgen's application entry point.
//! Handles command-line argument parsing and wires the configuration,
//! template source and processor together.

use solgen::{
    cli::{get_args, Args},
    config::{apply_overrides, build_context, load_context_file, ContextConfig},
    engine::TemplateEngine,
    error::{default_error_handler, Result},
    ignore::parse_ignore_file,
    logger::init_logger,
    processor::{ensure_output_dir, Processor},
    resource::DirectorySource,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Validates the output directory
/// 2. Loads the context file and applies overrides
/// 3. Collects template resources, honouring .solgenignore
/// 4. Generates every resource with one engine instance
fn run(args: Args) -> Result<()> {
    let output_root = ensure_output_dir(&args.output_dir, args.force)?;

    let mut config = match &args.context {
        Some(path) => load_context_file(path)?,
        None => ContextConfig::new(),
    };
    apply_overrides(&mut config, &args.overrides);
    let context = build_context(&output_root, config);

    let ignored = parse_ignore_file(&args.template)?;
    let source = DirectorySource::new(&args.template)?.with_ignored(ignored);

    println!("Using template from '{}'", args.template.display());

    let engine = TemplateEngine::new();
    let processor = Processor::new(&engine, &source);
    for file in processor.generate(&context)? {
        println!("Generated: '{}'", file.target.display());
    }

    println!("Solution generation completed successfully in {}.", output_root.display());
    Ok(())
}
