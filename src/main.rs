use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use campus_palette::analysis::{AestheticAnalyzer, LocalAnalyzer, ReplayAnalyzer};
use campus_palette::catalog::{Catalog, CategoryFilter, ColorEntry};
use campus_palette::cli::{Args, Command};
use campus_palette::sampler::{Bounds, Point};
use campus_palette::session::{ExtractionSession, SessionConfig};
use campus_palette::tui;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SessionConfig {
        preview_capacity: args.preview_capacity,
        ..SessionConfig::default()
    };

    match args.command {
        Command::List { category } => list(&Catalog::baseline(), category),
        Command::Show { id } => show(&Catalog::baseline(), &id),
        Command::Sample {
            image,
            x,
            y,
            width,
            height,
        } => {
            let mut session = ExtractionSession::new(Catalog::baseline(), config);
            let dims = session.load_image(read_image(&image)?)?;
            let bounds = Bounds::new(
                0.0,
                0.0,
                width.unwrap_or(dims.width as f64),
                height.unwrap_or(dims.height as f64),
            );
            let id = session.request_manual_sample(bounds, Point::new(x, y))?;
            print_new(session.catalog(), &[id]);
            Ok(())
        }
        Command::Extract {
            image,
            response,
            colors,
        } => {
            let config = SessionConfig {
                target_count: colors,
                ..config
            };
            let mut session = ExtractionSession::new(Catalog::baseline(), config);
            session.load_image(read_image(&image)?)?;
            let analyzer: Box<dyn AestheticAnalyzer> = match response {
                Some(path) => Box::new(ReplayAnalyzer::from_file(&path)?),
                None => Box::new(LocalAnalyzer::default()),
            };
            let ids = session.request_automatic_extraction(analyzer.as_ref())?;
            print_new(session.catalog(), &ids);
            Ok(())
        }
        Command::Browse { image } => {
            let mut session = ExtractionSession::new(Catalog::baseline(), config);
            if let Some(path) = image {
                session.load_image(read_image(&path)?)?;
            }
            tui::run(tui::TuiApp::new(session))
        }
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| {
        if !path.exists() {
            format!("file not found: {}", path.display())
        } else {
            format!("failed to read image: {}", path.display())
        }
    })
}

fn row(entry: &ColorEntry) -> String {
    format!(
        "{:<28} {}  {:<22} {:<13} {}",
        entry.id,
        entry.hex(),
        entry.palette_code,
        entry.category.label(),
        entry.short_name()
    )
}

fn list(catalog: &Catalog, category: CategoryFilter) -> Result<()> {
    for entry in catalog.filter(category) {
        println!("{}", row(entry));
    }
    Ok(())
}

fn show(catalog: &Catalog, id: &str) -> Result<()> {
    let detail = catalog
        .select(id)
        .with_context(|| format!("no color with id '{id}'"))?;
    let cmyk = detail.cmyk;
    println!("{}", detail.entry.display_name);
    println!("palette code  {}", detail.entry.palette_code);
    println!("hex           {}", detail.hex);
    println!("rgb           {}", detail.entry.color.rgb_string());
    println!(
        "cmyk          C {} / M {} / Y {} / K {}",
        cmyk.c, cmyk.m, cmyk.y, cmyk.k
    );
    println!(
        "category      {} ({})",
        detail.entry.category,
        detail.entry.category.archive_label()
    );
    println!("provenance    {}", detail.entry.provenance);
    Ok(())
}

fn print_new(catalog: &Catalog, ids: &[String]) {
    for id in ids {
        if let Some(entry) = catalog.get(id) {
            println!("{}", row(entry));
        }
    }
}
