use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::dataset::Dataset;
use crate::error::{AnalyzerError, Result};
use crate::report::ClassificationReport;
use crate::tfidf::TfidfVectorizer;

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub max_features: usize,
    pub n_trees: u16,
    pub test_fraction: f64,
    pub split_seed: u64,
    pub forest_seed: u64,
}

impl From<&AnalyzerConfig> for ClassifierSettings {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            max_features: config.max_features,
            n_trees: config.n_trees,
            test_fraction: config.test_fraction,
            split_seed: config.split_seed,
            forest_seed: config.forest_seed,
        }
    }
}

/// Shuffles with `seed`, then takes the first `ceil(test_fraction * n)`
/// items as the test set and the rest as the training set.
pub fn train_test_split<T: Clone>(
    items: &[T],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>)> {
    let n = items.len();
    let n_test = (test_fraction * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(AnalyzerError::NotEnoughData(format!(
            "{n} labelled rows give {n_train} training and {n_test} test rows"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let test = order[..n_test].iter().map(|&idx| items[idx].clone()).collect();
    let train = order[n_test..].iter().map(|&idx| items[idx].clone()).collect();
    Ok((train, test))
}

fn fit_and_predict(
    vectorizer: &TfidfVectorizer,
    train_texts: &[&str],
    y_train: Vec<u32>,
    test_texts: &[&str],
    settings: &ClassifierSettings,
) -> Result<Vec<u32>> {
    let x_train = DenseMatrix::from_2d_vec(&vectorizer.transform(train_texts));
    let params = RandomForestClassifierParameters::default()
        .with_n_trees(settings.n_trees)
        .with_seed(settings.forest_seed);
    let forest: RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>> =
        RandomForestClassifier::fit(&x_train, &y_train, params).map_err(|err| {
            AnalyzerError::Classifier(format!("Failed to train classifier: {err}"))
        })?;

    let x_test = DenseMatrix::from_2d_vec(&vectorizer.transform(test_texts));
    forest
        .predict(&x_test)
        .map_err(|err| AnalyzerError::Classifier(format!("Failed to score test set: {err}")))
}

pub fn classify_documents(
    dataset: &Dataset,
    settings: &ClassifierSettings,
) -> Result<ClassificationReport> {
    let labelled = dataset.labelled_abstracts()?;
    let (train, test) = train_test_split(&labelled, settings.test_fraction, settings.split_seed)?;

    let train_texts: Vec<&str> = train.iter().map(|(text, _)| *text).collect();
    let vectorizer = TfidfVectorizer::fit(&train_texts, settings.max_features);
    if vectorizer.vocabulary_len() == 0 {
        return Err(AnalyzerError::NotEnoughData(
            "training abstracts contain no usable terms".to_string(),
        ));
    }

    let classes: Vec<&str> = train
        .iter()
        .map(|(_, category)| *category)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let y_train: Vec<u32> = train
        .iter()
        .map(|(_, category)| {
            classes
                .binary_search(category)
                .map(|idx| idx as u32)
                .map_err(|_| AnalyzerError::Classifier(format!("unknown class {category}")))
        })
        .collect::<Result<_>>()?;

    info!(
        train = train.len(),
        test = test.len(),
        classes = classes.len(),
        vocabulary = vectorizer.vocabulary_len(),
        trees = settings.n_trees,
        "training random forest"
    );

    let test_texts: Vec<&str> = test.iter().map(|(text, _)| *text).collect();
    let predicted = if classes.len() == 1 {
        // A forest needs two classes; a single training label is always the answer.
        vec![0; test_texts.len()]
    } else {
        fit_and_predict(&vectorizer, &train_texts, y_train, &test_texts, settings)?
    };

    let y_true: Vec<&str> = test.iter().map(|(_, category)| *category).collect();
    let y_pred: Vec<&str> = predicted
        .iter()
        .map(|&idx| {
            classes.get(idx as usize).copied().ok_or_else(|| {
                AnalyzerError::Classifier(format!("predicted unknown class index {idx}"))
            })
        })
        .collect::<Result<_>>()?;

    let report = ClassificationReport::from_predictions(&y_true, &y_pred);
    info!(accuracy = report.accuracy, "classification finished");
    Ok(report)
}
