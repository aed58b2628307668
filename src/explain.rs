use crate::{store::pair::ModelPair, text::NormalizedDocument};

/// Maximum number of terms in an explanation.
pub const TOP_TERMS: usize = 5;

/// A token of the input and the importance the forest learned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TermImportance {
    pub token: String,
    pub importance: f64,
}

/// Rank the distinct in-vocabulary tokens of `doc` by learned importance.
///
/// At most [`TOP_TERMS`] entries, most important first. Ties keep the
/// token's first position in the document. Empty or fully
/// out-of-vocabulary input yields an empty list.
pub fn explain(pair: &ModelPair, doc: &NormalizedDocument) -> Vec<TermImportance> {
    let importances = pair.forest().feature_importances();
    let mut terms: Vec<TermImportance> = doc
        .distinct()
        .into_iter()
        .filter_map(|token| {
            let idx = pair.vectorizer().index_of(token)?;
            let importance = *importances.get(idx)?;
            Some(TermImportance { token: token.to_string(), importance })
        })
        .collect();
    // stable sort keeps document order among equal scores
    terms.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    terms.truncate(TOP_TERMS);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TrainingParams, text::normalize};

    fn pair() -> ModelPair {
        ModelPair::fallback(&TrainingParams::FALLBACK).unwrap()
    }

    #[test]
    fn at_most_five_descending_from_input() {
        let pair = pair();
        let doc = normalize(
            "Shocking government conspiracy: the miracle cure secret they don't want you to know, \
             experts confirmed evidence from researchers at the university",
        );
        let terms = explain(&pair, &doc);

        assert!(terms.len() <= TOP_TERMS);
        assert!(!terms.is_empty());
        for w in terms.windows(2) {
            assert!(w[0].importance >= w[1].importance);
        }
        let distinct = doc.distinct();
        assert!(terms.iter().all(|t| distinct.contains(&t.token.as_str())));
    }

    #[test]
    fn repeated_tokens_are_counted_once() {
        let pair = pair();
        let terms = explain(&pair, &normalize("conspiracy conspiracy conspiracy"));
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].token, "conspiracy");
    }

    #[test]
    fn empty_and_unknown_input_explain_nothing() {
        let pair = pair();
        assert!(explain(&pair, &normalize("")).is_empty());
        assert!(explain(&pair, &normalize("zebras juggling marmalade")).is_empty());
    }
}
