//! Human-readable tables printed to stdout

use fraudlens_data::derive::DeriveSummary;
use fraudlens_features::{
    column::{CategoricalColumn, NumericColumn},
    profile::{ClassSummary, LevelRate},
};
use fraudlens_models::classifier::RankedFeature;
use fraudlens_stats::descriptive::DescriptiveStats;

use crate::pipeline::{AnalysisReport, ModelDetails, ModelOutcome, ModelReport};

const RULE_WIDTH: usize = 72;

fn heading(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn rule() {
    println!("  {}", "-".repeat(RULE_WIDTH - 2));
}

pub fn print_derive_summary(summary: &DeriveSummary) {
    println!(
        "Records: {} read, {} derived, {} dropped ({} parse, {} label)",
        summary.total,
        summary.derived,
        summary.dropped(),
        summary.dropped_parse,
        summary.dropped_label
    );
}

pub fn print_analysis(report: &AnalysisReport) {
    heading("Fraud Factor Analysis");
    print_derive_summary(&report.derive);
    println!(
        "Split:   {} train / {} eval (seed {})",
        report.split.train, report.split.eval, report.split.seed
    );
    println!();

    print_metrics(&report.models);
    println!();

    for model in &report.models {
        print_model(model);
        println!();
    }
}

fn print_metrics(models: &[ModelReport]) {
    println!("Evaluation Metrics:");
    println!(
        "  {:<10} {:>6} {:>9} {:>11} {:>11} {:>9} {:>7}",
        "Model", "Thr", "Accuracy", "Sensitivity", "Specificity", "Balanced", "AUC"
    );
    rule();
    for model in models {
        match &model.outcome {
            ModelOutcome::Evaluated(r) => println!(
                "  {:<10} {:>6.2} {:>9.3} {:>11.3} {:>11.3} {:>9.3} {:>7}",
                model.name,
                r.threshold,
                r.accuracy,
                r.sensitivity,
                r.specificity,
                r.balanced_accuracy,
                r.auc.map_or_else(|| "-".to_owned(), |auc| format!("{auc:.3}"))
            ),
            ModelOutcome::Failed { error } => {
                println!("  {:<10} {:>6.2} failed: {error}", model.name, model.threshold);
            }
        }
    }
}

fn print_model(model: &ModelReport) {
    println!("{} ({} columns)", model.name, model.columns);
    if !model.zero_filled.is_empty() || !model.dropped_columns.is_empty() {
        println!(
            "  Reconciled eval matrix: {} zero-filled, {} dropped",
            model.zero_filled.len(),
            model.dropped_columns.len()
        );
    }
    for warning in &model.warnings {
        println!("  warning: {warning}");
    }
    if let ModelOutcome::Evaluated(r) = &model.outcome {
        let c = &r.confusion;
        println!(
            "  Confusion: TP={} FP={} TN={} FN={}",
            c.tp, c.fp, c.tn, c.fn_
        );
    }

    match &model.details {
        Some(ModelDetails::Logistic {
            coefficients,
            iterations,
            converged,
        }) => {
            println!("  IRLS iterations: {iterations} (converged: {converged})");
            println!(
                "  {:<32} {:>10} {:>10} {:>8} {:>10}",
                "Term", "Estimate", "Std.Err", "z", "p"
            );
            rule();
            for c in coefficients {
                println!(
                    "  {:<32} {:>10.4} {:>10.4} {:>8.2} {:>10.2e}",
                    c.feature, c.estimate, c.std_error, c.z, c.p_value
                );
            }
        }
        Some(ModelDetails::Lasso {
            lambda,
            lambda_min,
            nonzero,
            penalties,
        }) => {
            println!(
                "  Penalty: {lambda:.4e} (1-SE rule; minimum at {lambda_min:.4e}, {penalties} candidates)"
            );
            println!("  Nonzero coefficients: {nonzero}");
        }
        Some(ModelDetails::Boosted {
            rounds,
            metric,
            cv_metric,
            cover,
            frequency,
            ..
        }) => {
            let cv = cv_metric.map_or_else(|| "-".to_owned(), |v| format!("{v:.4}"));
            println!("  Rounds: {rounds} (cross-validated {metric}: {cv})");
            print_ranked("Cover", cover, 5);
            print_ranked("Frequency", frequency, 5);
        }
        None => {}
    }

    if let ModelOutcome::Evaluated(r) = &model.outcome {
        print_ranked("Influential features", &r.ranked_features, usize::MAX);
    }
}

fn print_ranked(title: &str, ranked: &[RankedFeature], limit: usize) {
    println!("  {title}:");
    if ranked.is_empty() {
        println!("    (none)");
    }
    for (rank, f) in ranked.iter().take(limit).enumerate() {
        println!("    {:>2}. {:<40} {:>10.4}", rank + 1, f.feature, f.score);
    }
}

pub fn print_level_rates(column: CategoricalColumn, rates: &[LevelRate], top_n: usize) {
    println!(
        "{column} (fraud rate by level, {} of {} levels shown):",
        rates.len().min(top_n),
        rates.len()
    );
    println!("  {:<32} {:>8} {:>8} {:>8}", "Level", "Count", "Fraud", "Rate");
    rule();
    for r in rates.iter().take(top_n) {
        println!(
            "  {:<32} {:>8} {:>8} {:>7.2}%",
            r.level,
            r.count,
            r.fraud,
            r.rate * 100.0
        );
    }
}

pub fn print_class_summaries(summaries: &[ClassSummary]) {
    println!("Numeric columns by class:");
    println!(
        "  {:<14} {:<6} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Column", "Class", "Count", "Min", "Max", "Mean", "Median", "Std.Dev"
    );
    rule();
    for summary in summaries {
        print_stats_row(summary.column, "fraud", summary.fraud.as_ref());
        print_stats_row(summary.column, "legit", summary.legit.as_ref());
    }
}

fn print_stats_row(column: NumericColumn, class: &str, stats: Option<&DescriptiveStats>) {
    match stats {
        Some(s) => println!(
            "  {:<14} {:<6} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            column.to_string(),
            class,
            s.count,
            s.min,
            s.max,
            s.mean,
            s.median,
            s.std_dev
        ),
        None => println!("  {:<14} {:<6} {:>8}", column.to_string(), class, 0),
    }
}
