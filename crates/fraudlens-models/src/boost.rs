//! Gradient-boosted ensemble of regression trees
//!
//! Second-order boosting on the logistic loss: every round fits a
//! depth-limited regression tree to the gradient and hessian of the loss at
//! the current margins and adds it, scaled by the learning rate `eta`.
//!
//! # Tree growth
//!
//! Trees grow level by level with exact greedy split search. Each feature's
//! rows are sorted once per dataset; at every level a single pass over each
//! sorted order accumulates left-hand gradient sums for all open nodes at
//! once. A split between two consecutive distinct values `a < b` uses the
//! threshold `(a + b) / 2` and sends rows with `x < threshold` left. The
//! split gain is
//!
//! ```text
//! ½ · [G_L² / (H_L + λ) + G_R² / (H_R + λ) − G² / (H + λ)] − γ
//! ```
//!
//! and a node is split only if the best gain is positive and both children
//! carry at least `min_child_weight` hessian.
//!
//! # Round selection
//!
//! Each fold of a stratified k-fold split boosts on its training part and
//! scores its holdout part after every round. A fold stops once its metric
//! has not improved for `patience` rounds, or at `max_rounds`. The per-round
//! scores are averaged over the rounds every fold reached, and the selected
//! round count is the best averaged round (the earliest among equals). The
//! final ensemble is boosted on the full matrix for exactly that many rounds.

use fraudlens_features::matrix::{ColumnSet, FeatureMatrix};
use fraudlens_stats::roc;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::{
        self, Classifier, FitError, FitWarning, FittedModel, InfluencePolicy, RankedFeature,
        sigmoid,
    },
    folds::{self, FoldAssignment},
};

const MIN_HESSIAN: f64 = 1e-16;

/// Holdout metric driving early stopping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StoppingMetric {
    /// Area under the ROC curve (higher is better).
    #[default]
    #[display("auc")]
    Auc,
    /// Misclassification rate at probability 0.5 (lower is better).
    #[display("error")]
    Error,
}

impl StoppingMetric {
    fn score(self, margins: &[f64], labels: &[bool]) -> f64 {
        let proba = margins.iter().map(|&m| sigmoid(m)).collect::<Vec<_>>();
        match self {
            Self::Auc => roc::auc(&proba, labels).unwrap_or(f64::NAN),
            Self::Error => roc::error_rate(&proba, labels, 0.5),
        }
    }

    /// Whether `candidate` is strictly better than `best`.
    #[must_use]
    pub fn improves(self, candidate: f64, best: f64) -> bool {
        match self {
            Self::Auc => candidate > best,
            Self::Error => candidate < best,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Learning rate.
    pub eta: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights.
    pub lambda: f64,
    /// Minimum gain required to split.
    pub gamma: f64,
    /// Initial prediction for every row, as a probability.
    pub base_score: f64,
    pub max_rounds: usize,
    pub patience: usize,
    pub metric: StoppingMetric,
    pub folds: usize,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            eta: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            lambda: 1.0,
            gamma: 0.0,
            base_score: 0.5,
            max_rounds: 1000,
            patience: 50,
            metric: StoppingMetric::Auc,
            folds: 5,
        }
    }
}

impl BoostConfig {
    /// Reject parameters that make the loss or the leaf weights undefined.
    pub fn validate(&self) -> Result<(), FitError> {
        let checks = [
            ("eta", self.eta, self.eta > 0.0 && self.eta.is_finite()),
            (
                "base_score",
                self.base_score,
                self.base_score > 0.0 && self.base_score < 1.0,
            ),
            ("lambda", self.lambda, self.lambda >= 0.0 && self.lambda.is_finite()),
            (
                "min_child_weight",
                self.min_child_weight,
                self.min_child_weight >= 0.0 && self.min_child_weight.is_finite(),
            ),
            ("gamma", self.gamma, self.gamma >= 0.0 && self.gamma.is_finite()),
        ];
        match checks.into_iter().find(|&(_, _, valid)| !valid) {
            Some((parameter, value, _)) => Err(FitError::InvalidParameter { parameter, value }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    #[must_use]
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if row[feature] < threshold { left } else { right },
            }
        }
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

/// Which importance measure to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ImportanceKind {
    #[display("gain")]
    Gain,
    #[display("cover")]
    Cover,
    #[display("frequency")]
    Frequency,
}

/// Per-feature importance, each measure normalized to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    /// Share of total split gain.
    pub gain: Vec<f64>,
    /// Share of total hessian mass at splitting nodes.
    pub cover: Vec<f64>,
    /// Share of split count.
    pub frequency: Vec<f64>,
}

impl FeatureImportance {
    fn from_splits(n_features: usize, splits: &[SplitRecord]) -> Self {
        let mut gain = vec![0.0; n_features];
        let mut cover = vec![0.0; n_features];
        let mut frequency = vec![0.0; n_features];
        for split in splits {
            gain[split.feature] += split.gain;
            cover[split.feature] += split.cover;
            frequency[split.feature] += 1.0;
        }
        for v in [&mut gain, &mut cover, &mut frequency] {
            let total = v.iter().sum::<f64>();
            if total > 0.0 {
                v.iter_mut().for_each(|x| *x /= total);
            }
        }
        Self {
            gain,
            cover,
            frequency,
        }
    }

    #[must_use]
    pub fn get(&self, kind: ImportanceKind) -> &[f64] {
        match kind {
            ImportanceKind::Gain => &self.gain,
            ImportanceKind::Cover => &self.cover,
            ImportanceKind::Frequency => &self.frequency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoostedFit {
    pub base_margin: f64,
    pub eta: f64,
    pub trees: Vec<Tree>,
    /// Selected round count.
    pub rounds: usize,
    pub metric: StoppingMetric,
    /// Cross-validated metric per round, averaged over folds.
    pub cv_curve: Vec<f64>,
    pub importance: FeatureImportance,
}

impl BoostedFit {
    pub(crate) fn log_odds(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    pub(crate) fn ranking(
        &self,
        columns: &ColumnSet,
        policy: &InfluencePolicy,
    ) -> Vec<RankedFeature> {
        let mut ranked = self.importance_ranking(columns, ImportanceKind::Gain);
        ranked.truncate(policy.top_n);
        ranked
    }

    /// Features with nonzero importance under `kind`, most important first.
    #[must_use]
    pub fn importance_ranking(
        &self,
        columns: &ColumnSet,
        kind: ImportanceKind,
    ) -> Vec<RankedFeature> {
        let mut ranked = columns
            .iter()
            .zip(self.importance.get(kind))
            .filter(|(_, v)| **v > 0.0)
            .map(|(name, &score)| RankedFeature {
                feature: name.to_owned(),
                score,
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.feature.cmp(&b.feature))
        });
        ranked
    }
}

#[derive(Debug, Clone)]
pub struct BoostTrainer {
    config: BoostConfig,
    seed: u64,
}

impl BoostTrainer {
    #[must_use]
    pub fn new(config: BoostConfig, seed: u64) -> Self {
        Self { config, seed }
    }
}

impl Classifier for BoostTrainer {
    fn name(&self) -> &str {
        "boosted"
    }

    fn fit(&self, train: &FeatureMatrix) -> Result<FittedModel, FitError> {
        self.config.validate()?;
        classifier::check_trainable(train)?;
        let folds = FoldAssignment::stratified(train.labels(), self.config.folds, self.seed)?;
        let base_margin = logit(self.config.base_score);

        let runs = folds::map_folds(folds.k(), |fold| {
            let fit_rows = folds.train_indices(fold);
            let holdout_rows = folds.holdout_indices(fold);
            let data = Dataset::new(train, &fit_rows);
            let holdout = Holdout {
                x: train.values().select(Axis(0), &holdout_rows),
                labels: holdout_rows.iter().map(|&i| train.labels()[i]).collect(),
            };
            let run = boost(
                &data,
                &self.config,
                base_margin,
                self.config.max_rounds,
                Some(&holdout),
            );
            tracing::debug!(
                fold,
                rounds = run.curve.len(),
                stopped_early = run.stopped_early,
                "cross-validation fold finished"
            );
            run
        });

        let mut warnings = vec![];
        if runs.iter().any(|r| !r.stopped_early) {
            warnings.push(FitWarning::RoundBudgetExhausted {
                rounds: self.config.max_rounds,
            });
        }
        let curves = runs.into_iter().map(|r| r.curve).collect::<Vec<_>>();
        let (rounds, cv_curve) = select_rounds(&curves, self.config.metric);

        let all_rows = (0..train.n_rows()).collect::<Vec<_>>();
        let data = Dataset::new(train, &all_rows);
        let run = boost(&data, &self.config, base_margin, rounds, None);
        let importance = FeatureImportance::from_splits(train.n_cols(), &run.splits);

        tracing::info!(
            rounds,
            evaluated = cv_curve.len(),
            metric = %self.config.metric,
            score = rounds.checked_sub(1).and_then(|r| cv_curve.get(r)).copied().unwrap_or(f64::NAN),
            "fitted boosted ensemble"
        );

        let fit = BoostedFit {
            base_margin,
            eta: self.config.eta,
            trees: run.trees,
            rounds,
            metric: self.config.metric,
            cv_curve,
            importance,
        };
        Ok(FittedModel::new(
            self.name(),
            train.columns().clone(),
            fit,
            warnings,
        ))
    }
}

/// Best round count from per-fold holdout curves.
///
/// Averages the curves over their common prefix and returns the 1-based
/// round with the best mean (the earliest on ties) together with the mean
/// curve. Returns zero rounds if any curve is empty.
#[must_use]
pub fn select_rounds(curves: &[Vec<f64>], metric: StoppingMetric) -> (usize, Vec<f64>) {
    let len = curves.iter().map(Vec::len).min().unwrap_or(0);
    #[expect(clippy::cast_precision_loss)]
    let k = curves.len() as f64;
    let mean = (0..len)
        .map(|r| curves.iter().map(|c| c[r]).sum::<f64>() / k)
        .collect::<Vec<_>>();
    if mean.is_empty() {
        return (0, mean);
    }
    let mut best = 0;
    for r in 1..mean.len() {
        if metric.improves(mean[r], mean[best]) || (mean[best].is_nan() && !mean[r].is_nan()) {
            best = r;
        }
    }
    (best + 1, mean)
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Training rows with per-feature sort orders.
struct Dataset {
    x: Array2<f64>,
    labels: Vec<bool>,
    orders: Vec<Vec<usize>>,
}

impl Dataset {
    fn new(matrix: &FeatureMatrix, rows: &[usize]) -> Self {
        let x = matrix.values().select(Axis(0), rows);
        let labels = rows.iter().map(|&i| matrix.labels()[i]).collect();
        let orders = x
            .axis_iter(Axis(1))
            .map(|column| {
                let mut order = (0..column.len()).collect::<Vec<_>>();
                order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
                order
            })
            .collect();
        Self { x, labels, orders }
    }
}

struct Holdout {
    x: Array2<f64>,
    labels: Vec<bool>,
}

#[derive(Debug, Clone, Copy)]
struct SplitRecord {
    feature: usize,
    gain: f64,
    cover: f64,
}

struct BoostRun {
    trees: Vec<Tree>,
    splits: Vec<SplitRecord>,
    curve: Vec<f64>,
    stopped_early: bool,
}

fn boost(
    data: &Dataset,
    config: &BoostConfig,
    base_margin: f64,
    rounds: usize,
    holdout: Option<&Holdout>,
) -> BoostRun {
    let n = data.x.nrows();
    let mut margins = vec![base_margin; n];
    let mut holdout_margins = holdout.map(|h| vec![base_margin; h.x.nrows()]);
    let mut run = BoostRun {
        trees: vec![],
        splits: vec![],
        curve: vec![],
        stopped_early: false,
    };
    let mut best_round = 0;

    for round in 0..rounds {
        let (g, h): (Vec<f64>, Vec<f64>) = margins
            .iter()
            .zip(&data.labels)
            .map(|(&m, &y)| {
                let p = sigmoid(m);
                let target = if y { 1.0 } else { 0.0 };
                (p - target, (p * (1.0 - p)).max(MIN_HESSIAN))
            })
            .unzip();

        let tree = TreeBuilder {
            data,
            g: &g,
            h: &h,
            config,
        }
        .grow(&mut run.splits);

        for (margin, row) in margins.iter_mut().zip(data.x.axis_iter(Axis(0))) {
            *margin += tree.predict(row);
        }
        if let (Some(holdout), Some(hm)) = (holdout, holdout_margins.as_mut()) {
            for (margin, row) in hm.iter_mut().zip(holdout.x.axis_iter(Axis(0))) {
                *margin += tree.predict(row);
            }
            let score = config.metric.score(hm, &holdout.labels);
            run.curve.push(score);
            let best = run.curve[best_round];
            if config.metric.improves(score, best) || (best.is_nan() && !score.is_nan()) {
                best_round = round;
            }
            run.trees.push(tree);
            if round - best_round >= config.patience {
                run.stopped_early = true;
                break;
            }
        } else {
            run.trees.push(tree);
        }
    }
    run
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    gain: f64,
    feature: usize,
    threshold: f64,
    g_left: f64,
    h_left: f64,
}

struct TreeBuilder<'a> {
    data: &'a Dataset,
    g: &'a [f64],
    h: &'a [f64],
    config: &'a BoostConfig,
}

impl TreeBuilder<'_> {
    fn weight(&self, g: f64, h: f64) -> f64 {
        -g / (h + self.config.lambda)
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.config.lambda)
    }

    fn grow(&self, splits: &mut Vec<SplitRecord>) -> Tree {
        let n = self.data.x.nrows();
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut totals = vec![(self.g.iter().sum::<f64>(), self.h.iter().sum::<f64>())];
        let mut position = vec![0; n];
        let mut frontier = vec![0];

        for _depth in 0..self.config.max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut slot_of = vec![None; nodes.len()];
            for (slot, &node) in frontier.iter().enumerate() {
                slot_of[node] = Some(slot);
            }

            let mut best: Vec<Option<Candidate>> = vec![None; frontier.len()];
            for (feature, order) in self.data.orders.iter().enumerate() {
                let mut acc = vec![(0.0, 0.0, None::<f64>); frontier.len()];
                for &row in order {
                    let Some(slot) = slot_of[position[row]] else {
                        continue;
                    };
                    let x = self.data.x[[row, feature]];
                    let (g_left, h_left, last) = &mut acc[slot];
                    if let Some(prev) = *last
                        && x > prev
                    {
                        let (g_total, h_total) = totals[frontier[slot]];
                        if let Some(candidate) =
                            self.candidate(feature, (prev, x), (*g_left, *h_left), (g_total, h_total))
                            && best[slot].is_none_or(|b| candidate.gain > b.gain)
                        {
                            best[slot] = Some(candidate);
                        }
                    }
                    *g_left += self.g[row];
                    *h_left += self.h[row];
                    *last = Some(x);
                }
            }

            let mut next = vec![];
            for (slot, &node) in frontier.iter().enumerate() {
                let Some(c) = best[slot] else {
                    continue;
                };
                let (g_total, h_total) = totals[node];
                let left = nodes.len();
                let right = left + 1;
                nodes.push(Node::Leaf { value: 0.0 });
                nodes.push(Node::Leaf { value: 0.0 });
                totals.push((c.g_left, c.h_left));
                totals.push((g_total - c.g_left, h_total - c.h_left));
                nodes[node] = Node::Split {
                    feature: c.feature,
                    threshold: c.threshold,
                    left,
                    right,
                };
                splits.push(SplitRecord {
                    feature: c.feature,
                    gain: c.gain,
                    cover: h_total,
                });
                next.extend([left, right]);
            }

            for (row, pos) in position.iter_mut().enumerate() {
                if let Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } = nodes[*pos]
                {
                    *pos = if self.data.x[[row, feature]] < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
            frontier = next;
        }

        for (node, &(g, h)) in nodes.iter_mut().zip(&totals) {
            if let Node::Leaf { value } = node {
                *value = self.config.eta * self.weight(g, h);
            }
        }
        Tree { nodes }
    }

    /// Split of a node with sums `total` between sorted values `prev < x`,
    /// given the sums `left` of every row below `x`.
    fn candidate(
        &self,
        feature: usize,
        (prev, x): (f64, f64),
        (g_left, h_left): (f64, f64),
        (g_total, h_total): (f64, f64),
    ) -> Option<Candidate> {
        let g_right = g_total - g_left;
        let h_right = h_total - h_left;
        let min = self.config.min_child_weight;
        if h_left < min || h_right < min {
            return None;
        }
        let gain = 0.5
            * (self.score(g_left, h_left) + self.score(g_right, h_right)
                - self.score(g_total, h_total))
            - self.config.gamma;
        if gain <= 0.0 {
            return None;
        }
        let mid = prev + (x - prev) / 2.0;
        let threshold = if mid > prev { mid } else { x };
        Some(Candidate {
            gain,
            feature,
            threshold,
            g_left,
            h_left,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::ModelParams,
        testutil::{matrix, synthetic},
    };

    fn step_data() -> FeatureMatrix {
        let rows = (0..10).map(|i| vec![f64::from(i), 0.0]).collect();
        let labels = (0..10).map(|i| i < 5).collect();
        matrix(&["x", "constant"], rows, labels)
    }

    #[test]
    fn test_single_tree_finds_threshold_and_leaf_weights() {
        let m = step_data();
        let config = BoostConfig {
            eta: 1.0,
            max_depth: 1,
            min_child_weight: 0.0,
            lambda: 0.0,
            ..BoostConfig::default()
        };
        let all = (0..10).collect::<Vec<_>>();
        let run = boost(&Dataset::new(&m, &all), &config, 0.0, 1, None);
        let tree = &run.trees[0];
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(
            tree.nodes[0],
            Node::Split {
                feature: 0,
                threshold: 4.5,
                left: 1,
                right: 2
            }
        );
        // g = ∓0.5, h = 0.25 per row, five rows per side
        let row = ndarray::array![3.0, 0.0];
        assert!((tree.predict(row.view()) - 2.0).abs() < 1e-12);
        let row = ndarray::array![7.0, 0.0];
        assert!((tree.predict(row.view()) + 2.0).abs() < 1e-12);
        assert_eq!(run.splits.len(), 1);
        assert!((run.splits[0].cover - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_select_rounds_picks_best_not_last() {
        let curves = vec![
            vec![0.60, 0.70, 0.80, 0.75, 0.74, 0.73],
            vec![0.62, 0.72, 0.78, 0.77, 0.70],
        ];
        let (rounds, mean) = select_rounds(&curves, StoppingMetric::Auc);
        assert_eq!(mean.len(), 5);
        assert_eq!(rounds, 3);

        let errors = vec![vec![0.3, 0.2, 0.2, 0.25]];
        assert_eq!(select_rounds(&errors, StoppingMetric::Error).0, 2);
    }

    #[test]
    fn test_early_stopping_respects_budget_and_patience() {
        let m = synthetic(300, 17);
        let config = BoostConfig {
            eta: 0.3,
            max_depth: 3,
            max_rounds: 60,
            patience: 5,
            ..BoostConfig::default()
        };
        let model = BoostTrainer::new(config, 2).fit(&m).unwrap();
        let ModelParams::Boosted(fit) = model.params() else {
            panic!("expected boosted params");
        };

        assert!(fit.rounds >= 1);
        assert!(fit.rounds <= 60);
        assert!(fit.cv_curve.len() <= 60);
        assert_eq!(fit.trees.len(), fit.rounds);
        let best = fit.cv_curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((fit.cv_curve[fit.rounds - 1] - best).abs() < f64::EPSILON);
        assert!(
            fit.cv_curve[..fit.rounds - 1]
                .iter()
                .all(|&s| s < fit.cv_curve[fit.rounds - 1])
        );
    }

    #[test]
    fn test_round_budget_is_a_hard_limit() {
        let m = synthetic(200, 3);
        let config = BoostConfig {
            max_rounds: 3,
            patience: 50,
            ..BoostConfig::default()
        };
        let model = BoostTrainer::new(config, 1).fit(&m).unwrap();
        let ModelParams::Boosted(fit) = model.params() else {
            panic!("expected boosted params");
        };
        assert!(fit.rounds <= 3);
        assert_eq!(fit.cv_curve.len(), 3);
        assert!(
            model
                .warnings()
                .contains(&FitWarning::RoundBudgetExhausted { rounds: 3 })
        );
    }

    #[test]
    fn test_importance_prefers_signal() {
        let m = synthetic(300, 9);
        let config = BoostConfig {
            max_rounds: 30,
            patience: 10,
            max_depth: 2,
            ..BoostConfig::default()
        };
        let model = BoostTrainer::new(config, 4).fit(&m).unwrap();
        let ModelParams::Boosted(fit) = model.params() else {
            panic!("expected boosted params");
        };
        for kind in [ImportanceKind::Gain, ImportanceKind::Cover, ImportanceKind::Frequency] {
            let total = fit.importance.get(kind).iter().sum::<f64>();
            assert!((total - 1.0).abs() < 1e-9);
        }
        assert!(fit.importance.gain[0] > fit.importance.gain[1]);

        let ranked = model.influence_ranking(&InfluencePolicy {
            significance: 0.001,
            top_n: 1,
        });
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].feature, "signal");
    }

    #[test]
    fn test_out_of_range_parameters_are_rejected() {
        let m = step_data();
        let cases = [
            ("base_score", BoostConfig { base_score: 0.0, ..BoostConfig::default() }),
            ("base_score", BoostConfig { base_score: 1.0, ..BoostConfig::default() }),
            ("eta", BoostConfig { eta: 0.0, ..BoostConfig::default() }),
            ("eta", BoostConfig { eta: f64::NAN, ..BoostConfig::default() }),
            ("lambda", BoostConfig { lambda: -1.0, ..BoostConfig::default() }),
            (
                "min_child_weight",
                BoostConfig { min_child_weight: -0.5, ..BoostConfig::default() },
            ),
            ("gamma", BoostConfig { gamma: -0.1, ..BoostConfig::default() }),
        ];
        for (parameter, config) in cases {
            let err = BoostTrainer::new(config, 0).fit(&m).unwrap_err();
            assert!(
                matches!(err, FitError::InvalidParameter { parameter: p, .. } if p == parameter),
                "{parameter}: {err}"
            );
        }
        assert_eq!(BoostConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_predictions_separate_classes() {
        let m = step_data();
        let config = BoostConfig {
            folds: 2,
            min_child_weight: 0.0,
            max_rounds: 20,
            patience: 5,
            metric: StoppingMetric::Error,
            ..BoostConfig::default()
        };
        let model = BoostTrainer::new(config, 0).fit(&m).unwrap();
        let predicted = model.predict(&m);
        assert_eq!(predicted, m.labels());
    }
}
