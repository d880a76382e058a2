//! Pagegen CLI - generate FAQ, product and comparison pages from product data

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagegen::{
    Category, Config, FixedResponseModel, LanguageModel, OfflineModel, Pipeline, ProductRecord,
    QuestionEngine,
};

#[derive(Parser)]
#[command(name = "pagegen")]
#[command(about = "Generate FAQ, product and comparison pages from product data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to pagegen.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all pages for one product
    Generate {
        /// Product JSON file (defaults to paths.input)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Second product JSON file for the comparison page
        #[arg(long)]
        compare: Option<PathBuf>,

        /// Output directory (defaults to paths.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Generate pages for every product file in a directory
    Batch {
        /// Directory containing product JSON files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory (defaults to paths.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Print synthesized FAQ questions for a product
    Questions {
        /// Product JSON file (defaults to paths.input)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of questions (defaults to questions.min_questions)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Print the generation prompt for a product
    Prompt {
        /// Product JSON file (defaults to paths.input)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Skip the model and use fallback questions only
    #[arg(long)]
    offline: bool,

    /// Replay a captured model response from a file instead of calling the model
    #[arg(long, conflicts_with = "offline")]
    replay: Option<PathBuf>,
}

impl ModelArgs {
    fn build(&self, config: &Config) -> Result<Box<dyn LanguageModel>> {
        if self.offline {
            return Ok(Box::new(OfflineModel));
        }
        if let Some(path) = &self.replay {
            return Ok(Box::new(FixedResponseModel::from_file(path)?));
        }
        config
            .build_model()
            .context("Failed to initialize model (use --offline to skip it)")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Generate {
            input,
            compare,
            output_dir,
            model,
        } => {
            let input = input.unwrap_or_else(|| config.paths.input.clone());
            let output_dir = output_dir.unwrap_or_else(|| config.paths.output_dir.clone());
            let pipeline = build_pipeline(&config, &model)?;

            let outputs = pipeline.run_files(&input, compare.as_deref(), &output_dir)?;

            println!("Product:          {}", outputs.product_name);
            println!("Questions:        {} ({} from fallback)", outputs.questions, outputs.from_fallback);
            println!("FAQ page:         {}", outputs.faq.display());
            println!("Product page:     {}", outputs.product_page.display());
            println!("Comparison page:  {}", outputs.comparison_page.display());
        }

        Commands::Batch {
            input_dir,
            output_dir,
            model,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.paths.output_dir.clone());
            let pipeline = build_pipeline(&config, &model)?;

            let report = pipeline.run_batch(&input_dir, &output_dir)?;

            println!("Files found:    {}", report.total_files);
            println!("Generated:      {}", report.generated);
            println!("Errors:         {}", report.errors);
            if report.errors > 0 {
                anyhow::bail!("{} product(s) failed", report.errors);
            }
        }

        Commands::Questions {
            input,
            count,
            format,
            model,
        } => {
            let input = input.unwrap_or_else(|| config.paths.input.clone());
            run_questions(&config, &input, count, &format, &model)?;
        }

        Commands::Prompt { input } => {
            let input = input.unwrap_or_else(|| config.paths.input.clone());
            let product = load_product(&input)?;
            let engine = QuestionEngine::new(OfflineModel, config.questions.clone())?;
            println!("{}", engine.prompt_for(&product, config.questions.min_questions));
        }
    }

    Ok(())
}

fn load_product(path: &Path) -> Result<ProductRecord> {
    ProductRecord::load(path).with_context(|| format!("Failed to load product from {:?}", path))
}

fn build_pipeline(config: &Config, model: &ModelArgs) -> Result<Pipeline<Box<dyn LanguageModel>>> {
    let model = model.build(config)?;
    tracing::info!("Using model: {}", model.name());
    let engine = QuestionEngine::new(model, config.questions.clone())?;
    Ok(Pipeline::new(engine))
}

fn run_questions(
    config: &Config,
    input: &Path,
    count: Option<usize>,
    format: &str,
    model: &ModelArgs,
) -> Result<()> {
    let product = load_product(input)?;
    let engine = QuestionEngine::new(model.build(config)?, config.questions.clone())?;
    let count = count.unwrap_or(config.questions.min_questions);

    let synthesis = engine.synthesize_detailed(&product, count)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&synthesis)?);
        return Ok(());
    }

    println!("\n=== FAQ questions for: \"{}\" ===\n", product.display_name());
    for (i, q) in synthesis.questions.iter().enumerate() {
        println!("{:>3}. {} {}", i + 1, category_label(q.category), q.question);
    }
    println!(
        "\n{} from model ({}), {} from fallback",
        synthesis.from_model, synthesis.model, synthesis.from_fallback
    );
    if let Some(err) = &synthesis.model_error {
        println!("{} {}", "Model error:".yellow(), err);
    }

    Ok(())
}

fn category_label(category: Category) -> colored::ColoredString {
    let label = format!("[{}]", category);
    match category {
        Category::Usage => label.cyan(),
        Category::Safety => label.red(),
        Category::Ingredients => label.green(),
        Category::Benefits => label.magenta(),
        Category::Pricing => label.yellow(),
        Category::Comparison => label.blue(),
        Category::General => label.normal(),
    }
}
