use anyhow::Result;
use policyflow::{
    io::{read_csv, write_parquet},
    schema::{normalize, write_columns},
    transform::{crosstab, group_sum, join, with_partition_rank, with_status, DateBetween, JoinMode, JoinSpec},
};
use std::{env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,policyflow=info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    let mut args = env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".into()));
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "out".into()));

    // ─── 2) read sources (every column tagged string) ────────────────
    let policies = read_csv(data_dir.join("policies.csv"))?;
    let claims = read_csv(data_dir.join("claims.csv"))?;
    info!(
        policies = policies.num_rows(),
        claims = claims.num_rows(),
        "loaded source tables"
    );

    // ─── 3) schema normalization ─────────────────────────────────────
    let (policies, report) = normalize(&policies);
    if report.total_degraded() > 0 {
        info!(degraded = report.total_degraded(), "policies had malformed cells");
    }
    let (claims, _) = normalize(&claims);
    println!("{}", policies.show(5));

    // ─── 4) derived status column ────────────────────────────────────
    let terms = with_status(&policies)?;
    println!("{}", terms.select(&["policy", "start_date", "status"])?.show(5));

    // ─── 5) claims joined onto the covering term ─────────────────────
    let spec = JoinSpec {
        key: "policy".into(),
        between: Some(DateBetween {
            date: "incident_date".into(),
            lo: "start_date".into(),
            hi: "end_date".into(),
        }),
        mode: JoinMode::Left,
    };
    let with_claims = join(&terms, &claims, &spec)?.drop_columns(&["policy_right"]);
    println!("{}", with_claims.show(20));

    // ─── 6) per-policy ranking and running premium ───────────────────
    let ranked = with_partition_rank(&terms, "policy", "start_date", "premium")?;
    println!(
        "{}",
        ranked
            .select(&["policy", "start_date", "premium", "rank", "running_total", "composite_key"])?
            .show(20)
    );

    // ─── 7) aggregates ───────────────────────────────────────────────
    let sums = group_sum(&terms, "status", "sum_insured")?.rename("sum_sum_insured", "total_insured")?;
    println!("{}", sums.show(10));

    let by_make = crosstab(&terms, "status", "make")?;
    println!("{}", by_make.show(10));

    // ─── 8) write output: parquet parts + marker + schema sidecar ────
    let target = out_dir.join("policy_terms");
    write_parquet(&ranked, &target, 2)?;
    write_columns("policy_terms", &out_dir, ranked.columns())?;
    info!(target = %target.display(), "all done");

    Ok(())
}
