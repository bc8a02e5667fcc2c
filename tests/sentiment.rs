use std::collections::HashMap;
use std::fs;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use tempfile::TempDir;
use treebank_sentiment::distribution::SentimentClass;
use treebank_sentiment::error::{PipelineError, Result};
use treebank_sentiment::sentiment::{SentimentAttributes, SentimentPipelineBuilder};
use treebank_sentiment::tree::Tree;

/// Distribution the fixture classifier assigns to every node when the
/// classifier weight is zero: softmax of the bias alone.
const TARGET: [f32; 5] = [0.05, 0.05, 0.10, 0.30, 0.50];

/// Write a D=2 parameter bundle. With `discriminative` off the classifier
/// ignores the node vector and every node scores [`TARGET`]; with it on,
/// different words produce different distributions.
fn write_bundle(dir: &Path, discriminative: bool) -> Result<()> {
    let device = Device::Cpu;
    let d = 2usize;

    fs::write(dir.join("config.json"), r#"{"dim": 2, "unk_token": "*UNK*"}"#)?;
    fs::write(
        dir.join("vocab.json"),
        r#"{"good": 0, "bad": 1, "movie": 2, "*UNK*": 3}"#,
    )?;

    let mut tensors: HashMap<String, Tensor> = HashMap::new();
    tensors.insert(
        "embeddings.weight".to_string(),
        Tensor::from_slice(&[1.0f32, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, 0.0], (4, d), &device)?,
    );
    tensors.insert(
        "composition.tensor".to_string(),
        Tensor::zeros((d, 2 * d, 2 * d), DType::F32, &device)?,
    );
    tensors.insert(
        "composition.weight".to_string(),
        Tensor::from_slice(
            &[0.5f32, 0.0, 0.5, 0.0, 0.0, 0.5, 0.0, 0.5],
            (d, 2 * d),
            &device,
        )?,
    );
    tensors.insert(
        "composition.bias".to_string(),
        Tensor::zeros(d, DType::F32, &device)?,
    );

    let classifier_w = if discriminative {
        Tensor::from_slice(
            &[-2.0f32, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 0.0],
            (5, d),
            &device,
        )?
    } else {
        Tensor::zeros((5, d), DType::F32, &device)?
    };
    tensors.insert("classifier.weight".to_string(), classifier_w);
    tensors.insert(
        "classifier.bias".to_string(),
        Tensor::from_slice(
            &[
                TARGET[0].ln(),
                TARGET[1].ln(),
                TARGET[2].ln(),
                TARGET[3].ln(),
                TARGET[4].ln(),
            ],
            5,
            &device,
        )?,
    );

    candle_core::safetensors::save(&tensors, dir.join("model.safetensors"))?;
    Ok(())
}

#[test]
fn single_leaf_good_is_very_positive() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), false)?;
    let pipeline = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;

    let tree = Tree::leaf("good")?;
    let output = pipeline.run(&tree)?;

    assert_eq!(output.prediction.category, SentimentClass::VeryPositive);
    assert_eq!(output.sentences.len(), 1);
    assert_eq!(output.stats.sentences_processed, 1);
    for (got, want) in output.sentences[0]
        .probabilities()
        .iter()
        .zip(TARGET.iter())
    {
        assert!((got - want).abs() < 2e-5, "got {got}, want {want}");
    }

    let attributes = SentimentAttributes::from_output(&output)?;
    assert_eq!(attributes.category, "Very Positive");

    let parsed: serde_json::Value = serde_json::from_str(&attributes.sentence_scores).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    let labels = ["Very Negative", "Negative", "Neutral", "Positive", "Very Positive"];
    for (label, want) in labels.iter().zip(TARGET.iter()) {
        let got = rows[0][*label].as_f64().unwrap();
        assert!((got - f64::from(*want)).abs() < 2e-5, "{label}: got {got}");
    }
    Ok(())
}

#[test]
fn overall_distribution_is_the_mean_of_sentences() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), true)?;
    let pipeline = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;

    let document = vec![
        Tree::leaf("good")?,
        Tree::leaf("bad")?,
        Tree::internal(Tree::leaf("good")?, Tree::leaf("movie")?),
    ];
    let output = pipeline.run(&document)?;

    assert_eq!(output.sentences.len(), 3);
    let n = output.sentences.len() as f64;
    for class in SentimentClass::ALL {
        let mean: f64 = output
            .sentences
            .iter()
            .map(|s| f64::from(s.get(class)))
            .sum::<f64>()
            / n;
        let got = f64::from(output.prediction.distribution.get(class));
        assert!((got - mean).abs() < 1e-6, "{class}: got {got}, want {mean}");
    }
    assert_eq!(
        output.prediction.category,
        output.prediction.distribution.argmax()
    );
    Ok(())
}

#[test]
fn single_sentence_document_keeps_its_distribution() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), true)?;
    let pipeline = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;

    let document = vec![Tree::internal(Tree::leaf("bad")?, Tree::leaf("movie")?)];
    let output = pipeline.run(&document)?;

    assert_eq!(output.prediction.distribution, output.sentences[0]);
    assert_eq!(output.prediction.category, output.sentences[0].argmax());
    Ok(())
}

#[test]
fn empty_document_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), false)?;
    let pipeline = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;

    let document: Vec<Tree> = Vec::new();
    let err = pipeline.run(&document);
    assert!(matches!(err, Err(PipelineError::EmptyDocument)));
    Ok(())
}

#[test]
fn evaluation_is_deterministic_across_runs() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), true)?;
    let pipeline = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;

    let document = vec![
        Tree::internal(
            Tree::internal(Tree::leaf("good")?, Tree::leaf("movie")?),
            Tree::leaf("bad")?,
        ),
        Tree::leaf("unseen-word")?,
    ];

    let first = pipeline.run(&document)?;
    let second = pipeline.run(&document)?;
    assert_eq!(first.sentences, second.sentences);
    assert_eq!(first.prediction.category, second.prediction.category);
    Ok(())
}

#[test]
fn per_node_scores_cover_the_whole_tree() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), true)?;
    let pipeline = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;

    let tree = Tree::internal(
        Tree::internal(Tree::leaf("good")?, Tree::leaf("movie")?),
        Tree::leaf("bad")?,
    );
    let scored = pipeline.score_tree(&tree)?;

    // Root + left phrase + three leaves, each carrying a valid distribution.
    let mut stack = vec![&scored];
    let mut nodes = 0;
    while let Some(node) = stack.pop() {
        nodes += 1;
        let sum: f32 = node.distribution().probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        stack.extend(node.children());
    }
    assert_eq!(nodes, 5);
    Ok(())
}

#[test]
fn missing_bundle_fails_with_model_load() {
    let dir = TempDir::new().unwrap();
    let err = SentimentPipelineBuilder::rntn_from_dir(dir.path().join("nowhere")).build();
    assert!(matches!(err, Err(PipelineError::ModelLoad(_))));
}

#[test]
fn bundle_without_unknown_word_entry_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), false)?;
    fs::write(dir.path().join("vocab.json"), r#"{"good": 0, "bad": 1, "movie": 2, "extra": 3}"#)?;

    let err = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build();
    assert!(matches!(err, Err(PipelineError::ModelLoad(_))));
    Ok(())
}

#[test]
fn bundle_with_out_of_range_vocab_index_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), false)?;
    fs::write(
        dir.path().join("vocab.json"),
        r#"{"good": 0, "bad": 1, "movie": 2, "*UNK*": 9}"#,
    )?;

    let err = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build();
    assert!(matches!(err, Err(PipelineError::ModelLoad(_))));
    Ok(())
}

#[test]
fn pipelines_over_the_same_bundle_share_the_model() -> Result<()> {
    let dir = TempDir::new()?;
    write_bundle(dir.path(), false)?;

    let first = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;
    let second = SentimentPipelineBuilder::rntn_from_dir(dir.path()).build()?;

    let tree = Tree::leaf("good")?;
    assert_eq!(
        first.run(&tree)?.prediction.category,
        second.run(&tree)?.prediction.category
    );
    Ok(())
}
