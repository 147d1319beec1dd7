//! Runs the traffic-client suite that lives inside the cluster.
//!
//! Some scenarios finish by executing the Go test suite shipped in the
//! `ixia-c-test-client` pod against the deployed topology and gating on its
//! pass rate.

use std::path::Path;

use super::Result;
use crate::kubectl::Kubectl;

/// Pod the client suite is executed in.
pub const TEST_CLIENT_POD: &str = "ixia-c-test-client";

/// Where the rendered options land inside the client pod.
pub const OPTS_DESTINATION: &str = "/home/keysight/athena/tests/go/tests/opts.json";

/// Pass/fail tally scraped from a `go test -v` report.
#[derive(Debug, PartialEq, Eq)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
}

impl SuiteReport {
    /// Percentage of cases that passed; zero when nothing ran.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total as f64 * 100.0
    }
}

/// Tally up a `go test -v` report.
pub fn parse_report(report: &str) -> SuiteReport {
    SuiteReport {
        total: report.lines().filter(|line| line.contains("=== RUN")).count(),
        passed: report.lines().filter(|line| line.contains("PASS:")).count(),
    }
}

/// Copy the rendered options into the client pod.
pub async fn copy_opts(kubectl: &Kubectl, opts: &Path) -> Result<()> {
    kubectl
        .copy_to_pod(opts, TEST_CLIENT_POD, OPTS_DESTINATION)
        .await
}

/// Run the client suite and return its raw report. A failing suite still
/// produces a report, so the exit status is not interpreted here.
pub async fn run_suite(kubectl: &Kubectl, testcase: Option<&str>, tags: &str) -> Result<String> {
    let test_command = match testcase {
        Some(testcase) => format!("go test -run={testcase} -tags={tags} -v"),
        None => format!("go test -timeout 24h -tags={tags} -v"),
    };
    let script = format!("cd go/tests; {test_command}");
    let output = kubectl.exec_captured(TEST_CLIENT_POD, &script).await?;
    Ok(output.stdout)
}

/// Gate a report on an expected pass rate.
pub fn check_report(report: &str, expected_pass_rate: f64) -> Result<()> {
    let tally = parse_report(report);
    if tally.total == 0 {
        return Err("client suite ran no cases".into());
    }
    let pass_rate = tally.pass_rate();
    if pass_rate < expected_pass_rate {
        return Err(format!(
            "client suite pass rate {pass_rate:.0}% below expected {expected_pass_rate:.0}% \
             ({} of {} passed)",
            tally.passed, tally.total
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const REPORT: &str = indoc! {r#"
        === RUN   TestUdpHeader
        --- PASS: TestUdpHeader (12.34s)
        === RUN   TestEbgpv4Routes
        --- PASS: TestEbgpv4Routes (45.67s)
        === RUN   TestTcpHeader
        --- FAIL: TestTcpHeader (1.23s)
        FAIL
    "#};

    #[test]
    fn tallies_runs_and_passes() {
        assert_eq!(
            parse_report(REPORT),
            SuiteReport {
                total: 3,
                passed: 2
            }
        );
    }

    #[test]
    fn gates_on_the_pass_rate() {
        assert!(check_report(REPORT, 100.0).is_err());
        check_report(REPORT, 50.0).unwrap();
        assert!(check_report("", 100.0).is_err());
    }
}
