use std::collections::HashMap;
use std::fs;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use treebank_sentiment::error::Result;
use treebank_sentiment::sentiment::{SentimentAttributes, SentimentPipelineBuilder};
use treebank_sentiment::tree::Tree;

/// Write a tiny demo bundle so the example runs without a real pretrained
/// model. Real bundles use the same three files with a larger vocabulary.
fn write_demo_bundle(dir: &Path) -> Result<()> {
    let device = Device::Cpu;
    let d = 2usize;

    fs::create_dir_all(dir)?;
    fs::write(dir.join("config.json"), r#"{"dim": 2, "unk_token": "*UNK*"}"#)?;
    fs::write(
        dir.join("vocab.json"),
        r#"{"good": 0, "bad": 1, "movie": 2, "plot": 3, "*UNK*": 4}"#,
    )?;

    let mut tensors: HashMap<String, Tensor> = HashMap::new();
    tensors.insert(
        "embeddings.weight".to_string(),
        Tensor::from_slice(
            &[1.0f32, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0],
            (5, d),
            &device,
        )?,
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
    tensors.insert(
        "classifier.weight".to_string(),
        Tensor::from_slice(
            &[-2.0f32, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 0.0],
            (5, d),
            &device,
        )?,
    );
    tensors.insert(
        "classifier.bias".to_string(),
        Tensor::zeros(5, DType::F32, &device)?,
    );

    candle_core::safetensors::save(&tensors, dir.join("model.safetensors"))?;
    Ok(())
}

fn main() -> Result<()> {
    let bundle_dir = std::env::temp_dir().join("treebank-sentiment-demo");
    write_demo_bundle(&bundle_dir)?;

    println!("Building pipeline...");
    let pipeline = SentimentPipelineBuilder::rntn_from_dir(&bundle_dir).build()?;
    println!("Pipeline built successfully.");

    // "good movie" / "bad plot" as parsed by an external constituency parser.
    let document = vec![
        Tree::internal(Tree::leaf("good")?, Tree::leaf("movie")?),
        Tree::internal(Tree::leaf("bad")?, Tree::leaf("plot")?),
    ];

    let output = pipeline.run(&document)?;

    println!("\n=== Document Sentiment ===");
    println!(
        "Overall: {} (p = {:.4})",
        output.prediction.category,
        output.prediction.distribution.get(output.prediction.category),
    );
    for (i, sentence) in output.sentences.iter().enumerate() {
        println!(
            "Sentence {}: {} (p = {:.4})",
            i,
            sentence.argmax(),
            sentence.get(sentence.argmax()),
        );
    }
    println!(
        "Completed in {:.2}ms",
        output.stats.total_time.as_secs_f64() * 1000.0
    );

    // Attribute form, as written back by a record pipeline adapter.
    let attributes = SentimentAttributes::from_output(&output)?;
    println!("\n=== Attribute Form ===");
    println!("category        = {}", attributes.category);
    println!("sentence_scores = {}", attributes.sentence_scores);

    Ok(())
}
