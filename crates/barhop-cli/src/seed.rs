use std::path::Path;

/// Validates a seed file and prints a one-line summary.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub(crate) fn run_seed_check(path: Option<&Path>) -> anyhow::Result<()> {
    let seed = barhop_core::load_seed(path)?;
    let source = path.map_or_else(|| "built-in seed".to_string(), |p| p.display().to_string());

    let featured = seed.events.iter().filter(|e| e.is_featured).count();
    println!(
        "{source}: ok ({} bars, {} events, {featured} featured)",
        seed.bars.len(),
        seed.events.len(),
    );
    Ok(())
}
