//! Page generation pipeline - parse, synthesize, render and write JSON artifacts

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine::QuestionEngine;
use crate::llm::LanguageModel;
use crate::pages::{render_comparison_page, render_faq_page, render_product_page};
use crate::product::ProductRecord;

pub const FAQ_FILE: &str = "faq.json";
pub const PRODUCT_PAGE_FILE: &str = "product_page.json";
pub const COMPARISON_FILE: &str = "comparison_page.json";

/// Files written for one product
#[derive(Debug, Clone, Serialize)]
pub struct PageOutputs {
    pub product_name: String,
    pub faq: PathBuf,
    pub product_page: PathBuf,
    pub comparison_page: PathBuf,
    pub questions: usize,
    pub from_fallback: usize,
}

/// Batch run summary
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total_files: usize,
    pub generated: usize,
    pub errors: usize,
    pub outputs: Vec<PageOutputs>,
}

/// Runs the full page pipeline with one shared engine
pub struct Pipeline<M: LanguageModel> {
    engine: QuestionEngine<M>,
}

impl<M: LanguageModel> Pipeline<M> {
    pub fn new(engine: QuestionEngine<M>) -> Self {
        Self { engine }
    }

    /// Generate all three pages for one product.
    ///
    /// Without `compare_with` the comparison page compares the product with itself.
    pub fn run_product(
        &self,
        product: &ProductRecord,
        compare_with: Option<&ProductRecord>,
        output_dir: &Path,
    ) -> Result<PageOutputs> {
        let synthesis = self
            .engine
            .synthesize_detailed(product, self.engine.settings().min_questions)
            .with_context(|| format!("Failed to synthesize questions for {}", product.display_name()))?;

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

        let faq = output_dir.join(FAQ_FILE);
        write_json(&faq, &render_faq_page(product, &synthesis))?;

        let product_page = output_dir.join(PRODUCT_PAGE_FILE);
        write_json(&product_page, &render_product_page(product))?;

        let comparison_page = output_dir.join(COMPARISON_FILE);
        let other = compare_with.unwrap_or(product);
        write_json(&comparison_page, &render_comparison_page(product, other))?;

        tracing::info!(
            "Generated pages for {} ({} questions, {} from fallback) in {:?}",
            product.display_name(),
            synthesis.questions.len(),
            synthesis.from_fallback,
            output_dir
        );

        Ok(PageOutputs {
            product_name: product.display_name().to_string(),
            faq,
            product_page,
            comparison_page,
            questions: synthesis.questions.len(),
            from_fallback: synthesis.from_fallback,
        })
    }

    /// Load product files and generate their pages.
    pub fn run_files(
        &self,
        input: &Path,
        compare_with: Option<&Path>,
        output_dir: &Path,
    ) -> Result<PageOutputs> {
        let product = ProductRecord::load(input)
            .with_context(|| format!("Failed to load product from {:?}", input))?;
        let other = compare_with
            .map(|p| {
                ProductRecord::load(p).with_context(|| format!("Failed to load product from {:?}", p))
            })
            .transpose()?;
        self.run_product(&product, other.as_ref(), output_dir)
    }

    /// Generate pages for every product file under `input_dir`.
    ///
    /// Each product is written to `output_dir/<slug>/`. Failing products are
    /// counted and skipped.
    pub fn run_batch(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        use indicatif::{ProgressBar, ProgressStyle};

        let files = find_product_files(input_dir);
        eprintln!("Found {} product files", files.len());

        let mut report = BatchReport {
            total_files: files.len(),
            ..Default::default()
        };
        if files.is_empty() {
            return Ok(report);
        }

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.green/black}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        for path in &files {
            pb.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );

            let result = ProductRecord::load(path)
                .with_context(|| format!("Failed to load product from {:?}", path))
                .and_then(|product| {
                    let dir = output_dir.join(product.slug());
                    self.run_product(&product, None, &dir)
                });

            match result {
                Ok(outputs) => {
                    report.generated += 1;
                    report.outputs.push(outputs);
                }
                Err(e) => {
                    tracing::error!("Error processing {:?}: {:#}", path, e);
                    report.errors += 1;
                }
            }

            pb.inc(1);
        }

        pb.finish_with_message("done");

        eprintln!(
            "\nPage generation complete: {} generated, {} errors",
            report.generated, report.errors
        );

        Ok(report)
    }
}

fn find_product_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().and_then(|ext| ext.to_str()) == Some("json")
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize page")?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
