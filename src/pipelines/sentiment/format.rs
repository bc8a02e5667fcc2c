use serde::Serialize;

use super::pipeline::Output;
use crate::distribution::{SentimentClass, SentimentDistribution};
use crate::error::Result;

/// One sentence's scores in the external attribute shape: exactly the five
/// label keys, most negative first.
#[derive(Serialize)]
struct SentenceScores {
    #[serde(rename = "Very Negative")]
    very_negative: f32,
    #[serde(rename = "Negative")]
    negative: f32,
    #[serde(rename = "Neutral")]
    neutral: f32,
    #[serde(rename = "Positive")]
    positive: f32,
    #[serde(rename = "Very Positive")]
    very_positive: f32,
}

impl From<&SentimentDistribution> for SentenceScores {
    fn from(dist: &SentimentDistribution) -> Self {
        Self {
            very_negative: dist.get(SentimentClass::VeryNegative),
            negative: dist.get(SentimentClass::Negative),
            neutral: dist.get(SentimentClass::Neutral),
            positive: dist.get(SentimentClass::Positive),
            very_positive: dist.get(SentimentClass::VeryPositive),
        }
    }
}

/// Pipeline output flattened into the two attribute values a record pipeline
/// writes back: the overall category label and the per-sentence scores as a
/// JSON array.
///
/// Pure serialization; no numeric computation happens here.
///
/// # Examples
///
/// ```rust,no_run
/// # use treebank_sentiment::sentiment::{SentimentAttributes, SentimentPipelineBuilder};
/// # use treebank_sentiment::tree::Tree;
/// # fn main() -> treebank_sentiment::error::Result<()> {
/// # let pipeline = SentimentPipelineBuilder::rntn_from_dir("models/sentiment-en").build()?;
/// let tree = Tree::leaf("good")?;
/// let output = pipeline.run(&tree)?;
/// let attributes = SentimentAttributes::from_output(&output)?;
/// println!("{} {}", attributes.category, attributes.sentence_scores);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentAttributes {
    /// One of `"Very Negative"`, `"Negative"`, `"Neutral"`, `"Positive"`,
    /// `"Very Positive"`.
    pub category: String,
    /// JSON array with one scores object per sentence, in document order.
    pub sentence_scores: String,
}

impl SentimentAttributes {
    /// Serialize an overall category and per-sentence distributions.
    pub fn new(category: SentimentClass, sentences: &[SentimentDistribution]) -> Result<Self> {
        let rows: Vec<SentenceScores> = sentences.iter().map(SentenceScores::from).collect();
        Ok(Self {
            category: category.to_string(),
            sentence_scores: serde_json::to_string(&rows)?,
        })
    }

    /// Serialize a pipeline [`Output`].
    pub fn from_output(output: &Output) -> Result<Self> {
        Self::new(output.prediction.category, &output.sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_labels_and_key_order() {
        let dist =
            SentimentDistribution::from_probabilities([0.05, 0.05, 0.10, 0.30, 0.50]).unwrap();
        let attrs =
            SentimentAttributes::new(SentimentClass::VeryPositive, std::slice::from_ref(&dist))
                .unwrap();

        assert_eq!(attrs.category, "Very Positive");
        assert_eq!(
            attrs.sentence_scores,
            r#"[{"Very Negative":0.05,"Negative":0.05,"Neutral":0.1,"Positive":0.3,"Very Positive":0.5}]"#
        );
    }

    #[test]
    fn one_object_per_sentence_in_document_order() {
        let first =
            SentimentDistribution::from_probabilities([1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let second =
            SentimentDistribution::from_probabilities([0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        let attrs =
            SentimentAttributes::new(SentimentClass::Neutral, &[first, second]).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&attrs.sentence_scores).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Very Negative"], 1.0);
        assert_eq!(rows[1]["Very Positive"], 1.0);
    }
}
