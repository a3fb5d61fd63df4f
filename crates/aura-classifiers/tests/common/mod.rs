//! Synthetic labeled data shared by the integration tests

#![allow(dead_code)]

use aura_classifiers::{AuxFeatures, FeatureRecord, LabeledDataset, TrainingOptions};

const DISTRESS_WORDS: [&str; 8] = [
    "hopeless", "alone", "worthless", "empty", "exhausted", "crying", "panic", "numb",
];
const CALM_WORDS: [&str; 8] = [
    "happy", "grateful", "sunny", "friends", "excited", "relaxed", "garden", "music",
];

/// `per_class` rows of each label, interleaved, with a sentiment column
pub fn synthetic_dataset(per_class: usize) -> LabeledDataset {
    let mut dataset = LabeledDataset::default();
    for i in 0..per_class {
        let distress = format!(
            "lately I feel {} and {} most nights",
            DISTRESS_WORDS[i % 8],
            DISTRESS_WORDS[(i * 3 + 1) % 8]
        );
        dataset.records.push(
            FeatureRecord::new(distress)
                .with_aux(AuxFeatures::from_named([("sentiment", -0.5), ("lex_liwc_negemo", 3.0)])),
        );
        dataset.labels.push(true);

        let calm = format!(
            "today was {} and {} with everyone",
            CALM_WORDS[i % 8],
            CALM_WORDS[(i * 5 + 2) % 8]
        );
        dataset.records.push(
            FeatureRecord::new(calm)
                .with_aux(AuxFeatures::from_named([("sentiment", 0.5), ("lex_liwc_posemo", 2.0)])),
        );
        dataset.labels.push(false);
    }
    dataset
}

/// The same data rendered as a CSV file body
pub fn synthetic_csv(per_class: usize) -> String {
    let dataset = synthetic_dataset(per_class);
    let mut out = String::from("text,label,sentiment,lex_liwc_negemo,lex_liwc_posemo\n");
    for (record, label) in dataset.records.iter().zip(&dataset.labels) {
        out.push_str(&format!(
            "\"{}\",{},{},{},{}\n",
            record.text,
            u8::from(*label),
            record.aux.sentiment,
            record.aux.lexicon[0],
            record.aux.lexicon[9],
        ));
    }
    out
}

/// Small forest so the tests stay quick
pub fn fast_options() -> TrainingOptions {
    let mut options = TrainingOptions::default();
    options.forest.n_estimators = 15;
    options
}
