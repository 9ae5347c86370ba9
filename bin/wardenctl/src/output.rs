//! Emit command results to standard output and metrics to files.
use anyhow::Result;
use prometheus::Encoder;
use prometheus::Registry;
use prometheus::TextEncoder;
use serde::Serialize;

/// Print a value to standard output as a JSON document.
pub fn json<T>(value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let document = serde_json::to_string_pretty(value)?;
    println!("{}", document);
    Ok(())
}

/// Write all metrics collected by the registry to a file in Prometheus text format.
pub fn metrics(path: &str, registry: &Registry) -> Result<()> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    std::fs::write(path, buffer)?;
    Ok(())
}
