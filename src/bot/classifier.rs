//! Multinomial naive Bayes over word counts, trained on a handful of phrases.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

static TOKEN: OnceLock<Regex> = OnceLock::new();

// Words of two or more characters; single letters carry no signal here.
fn token_pattern() -> &'static Regex {
    TOKEN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intent {
    Farewell,
    Greeting,
    Help,
    Identity,
    Purpose,
    Secret,
}

pub const UNKNOWN_REPLY: &str = "Sorry, I didn't understand that.";

impl Intent {
    pub fn reply(&self) -> &'static str {
        match self {
            Intent::Greeting => "Hello! How can I help you?",
            Intent::Farewell => "Goodbye! Have a nice day! 👋",
            Intent::Identity => "I'm your friendly chatbot. 😘",
            Intent::Help => "I can help you with various tasks. Just ask!",
            Intent::Purpose => "My purpose is world domination! 😈 Just kidding. Ask me anything!",
            Intent::Secret => "I like ChatGPT! 🤫 Don't tell anyone.",
        }
    }
}

pub const TRAINING_SET: &[(&str, Intent)] = &[
    ("hello", Intent::Greeting),
    ("hi", Intent::Greeting),
    ("how are you", Intent::Greeting),
    ("bye", Intent::Farewell),
    ("goodbye", Intent::Farewell),
    ("what is your name", Intent::Identity),
    ("who are you", Intent::Identity),
    ("what can you do", Intent::Help),
    ("what is your purpose", Intent::Purpose),
    ("tell me a secret", Intent::Secret),
];

#[derive(Debug)]
struct ClassModel {
    intent: Intent,
    log_prior: f64,
    feature_log_prob: Vec<f64>,
}

#[derive(Debug)]
pub struct IntentClassifier {
    vocabulary: HashMap<String, usize>,
    classes: Vec<ClassModel>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::train(TRAINING_SET)
    }
}

impl IntentClassifier {
    /// Fits with add-one smoothing.
    pub fn train(samples: &[(&str, Intent)]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let documents: Vec<(Vec<String>, Intent)> = samples
            .iter()
            .map(|(text, intent)| (tokenize(text), *intent))
            .collect();
        for (tokens, _) in &documents {
            for token in tokens {
                let next = vocabulary.len();
                vocabulary.entry(token.clone()).or_insert(next);
            }
        }

        // (document count, per-word counts)
        let mut counts: BTreeMap<Intent, (usize, Vec<f64>)> = BTreeMap::new();
        for (tokens, intent) in &documents {
            let entry = counts
                .entry(*intent)
                .or_insert_with(|| (0, vec![0.0; vocabulary.len()]));
            entry.0 += 1;
            for token in tokens {
                if let Some(&index) = vocabulary.get(token) {
                    entry.1[index] += 1.0;
                }
            }
        }

        let total_documents = documents.len() as f64;
        let vocabulary_size = vocabulary.len() as f64;
        let classes = counts
            .into_iter()
            .map(|(intent, (documents, word_counts))| {
                let total_words: f64 = word_counts.iter().sum();
                let denominator = total_words + vocabulary_size;
                ClassModel {
                    intent,
                    log_prior: (documents as f64 / total_documents).ln(),
                    feature_log_prob: word_counts
                        .iter()
                        .map(|count| ((count + 1.0) / denominator).ln())
                        .collect(),
                }
            })
            .collect();

        Self { vocabulary, classes }
    }

    /// Most likely intent, or `None` when no word of `text` was seen in
    /// training.
    pub fn predict(&self, text: &str) -> Option<Intent> {
        let mut features: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *features.entry(index).or_insert(0.0) += 1.0;
            }
        }
        if features.is_empty() {
            return None;
        }

        let mut best: Option<(Intent, f64)> = None;
        for class in &self.classes {
            let score = class.log_prior
                + features
                    .iter()
                    .map(|(index, count)| count * class.feature_log_prob[*index])
                    .sum::<f64>();
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((class.intent, score));
            }
        }
        best.map(|(intent, _)| intent)
    }

    /// Reply for `text`, falling back to the unknown reply.
    pub fn reply(&self, text: &str) -> &'static str {
        self.predict(text).map_or(UNKNOWN_REPLY, |intent| intent.reply())
    }
}
