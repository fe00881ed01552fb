pub mod lexicon;
pub mod pattern;
pub mod perturbation;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::app::ports::{
    EntityRecognizerPort, PerturbationSource, QualityClassifierPort, SentimentClassifierPort,
};
use crate::config::InferenceConfig;
use crate::error::Result;
use crate::infra::http_client::InferenceHttp;

pub use lexicon::{LexiconQualityClassifier, LexiconSentimentClassifier};
pub use pattern::PatternEntityRecognizer;
pub use perturbation::{SeededPerturbation, ThreadRngPerturbation};
pub use remote::{HttpEntityRecognizer, HttpQualityClassifier, HttpSentimentClassifier};

/// The set of inference services the pipeline talks to
#[derive(Clone)]
pub struct InferenceServices {
    pub recognizer: Arc<dyn EntityRecognizerPort>,
    pub quality: Arc<dyn QualityClassifierPort>,
    pub sentiment: Arc<dyn SentimentClassifierPort>,
    pub perturbation: Arc<dyn PerturbationSource>,
}

impl InferenceServices {
    /// Remote adapters where a URL is configured, offline ones otherwise
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        let http = InferenceHttp::new(Duration::from_secs(config.timeout_secs), config.api_token.clone())?;

        let recognizer: Arc<dyn EntityRecognizerPort> = match &config.ner_url {
            Some(url) => {
                info!("Using remote entity recognizer at {}", url);
                Arc::new(HttpEntityRecognizer::new(http.clone(), url.clone()))
            }
            None => Arc::new(PatternEntityRecognizer::new()),
        };
        let quality: Arc<dyn QualityClassifierPort> = match &config.classifier_url {
            Some(url) => {
                info!("Using remote quality classifier at {}", url);
                Arc::new(HttpQualityClassifier::new(http.clone(), url.clone()))
            }
            None => Arc::new(LexiconQualityClassifier::new()),
        };
        let sentiment: Arc<dyn SentimentClassifierPort> = match &config.sentiment_url {
            Some(url) => {
                info!("Using remote sentiment classifier at {}", url);
                Arc::new(HttpSentimentClassifier::new(http, url.clone()))
            }
            None => Arc::new(LexiconSentimentClassifier::new()),
        };
        let perturbation: Arc<dyn PerturbationSource> = match config.seed {
            Some(seed) => Arc::new(SeededPerturbation::new(seed)),
            None => Arc::new(ThreadRngPerturbation),
        };

        Ok(Self {
            recognizer,
            quality,
            sentiment,
            perturbation,
        })
    }

    /// Offline adapters only
    pub fn offline() -> Self {
        Self {
            recognizer: Arc::new(PatternEntityRecognizer::new()),
            quality: Arc::new(LexiconQualityClassifier::new()),
            sentiment: Arc::new(LexiconSentimentClassifier::new()),
            perturbation: Arc::new(ThreadRngPerturbation),
        }
    }
}
