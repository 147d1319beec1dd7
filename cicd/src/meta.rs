//! Host metadata recorded with every CI run.

use std::fmt;

use anyhow::Result;

#[derive(Debug)]
pub struct Metadata {
    pub distribution: String,
    pub cpus: usize,
    pub ram_gb: f64,
    pub operator_build: String,
}

impl Metadata {
    pub fn collect(operator_build: &str) -> Result<Self> {
        Ok(Self {
            distribution: distribution()?,
            cpus: std::thread::available_parallelism()?.get(),
            ram_gb: parse_mem_total_gb(&std::fs::read_to_string("/proc/meminfo")?)?,
            operator_build: operator_build.to_owned(),
        })
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distribution={} cpus={} ram={:.3}GB operator={}",
            self.distribution, self.cpus, self.ram_gb, self.operator_build
        )
    }
}

/// Name of the Linux distribution, in lowercase.
fn distribution() -> Result<String> {
    let issue = std::fs::read_to_string("/etc/issue")?;
    Ok(issue
        .split_whitespace()
        .next()
        .unwrap_or("unknown")
        .to_lowercase())
}

fn parse_mem_total_gb(meminfo: &str) -> Result<f64> {
    let kb: f64 = meminfo
        .lines()
        .find_map(|line| line.strip_prefix("MemTotal:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("no MemTotal in meminfo"))?;
    Ok((kb / 1_000_000.0 * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mem_total() {
        let meminfo = "MemTotal:       16384256 kB\nMemFree:         1024 kB\n";
        assert_eq!(parse_mem_total_gb(meminfo).unwrap(), 16.384);
        assert!(parse_mem_total_gb("MemFree: 1 kB").is_err());
    }
}
