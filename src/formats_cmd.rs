use std::io::Write;

use crate::catalog;
use crate::{BenchError, BenchResult};

pub fn run(json: bool) -> BenchResult<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, catalog::formats::all())
            .map_err(|e| BenchError::Message(e.to_string()))?;
        writeln!(out)?;
        return Ok(());
    }
    write_listing(&mut out)
}

fn write_listing<W: Write>(out: &mut W) -> BenchResult<()> {
    for (category, formats) in catalog::by_category() {
        writeln!(out, "{}", category.title())?;
        for f in formats {
            writeln!(out, "  {:<8} {:<14} {}", f.id.as_str(), f.name, f.extensions.join(", "))?;
            writeln!(out, "           {}", f.description)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
