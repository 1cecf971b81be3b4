//! Checks the external links of a statically generated site.
//!
//! Some public sites block or throttle automated clients, which makes a naive
//! check noisy. Those hosts are skipped through [`ignore::IgnoreList`] and
//! listed separately in the output.

pub mod checker;
pub mod config;
pub mod ignore;
pub mod report;
pub mod scanner;

use checker::Checker;
use config::Config;
use ignore::IgnoreList;
use report::{Plan, Report};

/// Scans `config.root`, prints the plan and checks every link that is not ignored.
pub async fn run(config: &Config, ignore: &IgnoreList) -> anyhow::Result<Report> {
    let plan = Plan::new(scanner::find_links(&config.root), ignore);
    print!("{}", plan);

    let checker = Checker::new(config)?;
    let outcomes = checker.check_all(&plan.to_check, config.concurrency).await;
    Ok(Report::new(outcomes))
}
