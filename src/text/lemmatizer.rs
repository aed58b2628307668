use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::stopwords::is_stopword;

/// Irregular plurals mapped to their dictionary form.
static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("men", "man"),
        ("women", "woman"),
        ("gentlemen", "gentleman"),
        ("children", "child"),
        ("mice", "mouse"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("halves", "half"),
        ("thieves", "thief"),
        ("wolves", "wolf"),
        ("data", "datum"),
        ("media", "medium"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("crises", "crisis"),
        ("analyses", "analysis"),
        ("theses", "thesis"),
        ("hypotheses", "hypothesis"),
        ("diagnoses", "diagnosis"),
        ("indices", "index"),
        ("vertices", "vertex"),
    ]
    .into_iter()
    .collect()
});

/// Words that look plural but are their own base form.
const INVARIANT: &[&str] = &[
    "news", "series", "species", "means", "politics", "economics", "physics", "mathematics",
    "ethics", "athletics", "always", "perhaps", "whereas", "towards", "afterwards", "sometimes",
    "nevertheless", "lens", "chaos", "bias", "alias", "atlas", "canvas", "illinois", "kansas",
    "texas", "arkansas", "paris", "brussels", "wales", "philippines", "netherlands",
];

/// Noun lemmatizer in the style of WordNet's morphological rules.
///
/// Only inflectional plural endings are undone; everything else passes
/// through. A candidate that collapses onto a stopword is rejected so the
/// stopword filter never has anything left to do on a second pass.
pub fn lemmatize(token: &str) -> String {
    if let Some(lemma) = IRREGULAR.get(token) {
        return (*lemma).to_string();
    }
    let Some(stripped) = strip_plural(token) else {
        return token.to_string();
    };
    // possessive plurals arrive as "womens", "childrens"
    let lemma = match IRREGULAR.get(stripped.as_str()) {
        Some(lemma) => (*lemma).to_string(),
        None => stripped,
    };
    if is_stopword(&lemma) {
        token.to_string()
    } else {
        lemma
    }
}

fn strip_plural(token: &str) -> Option<String> {
    let len = token.chars().count();
    if len <= 3 || !token.ends_with('s') || INVARIANT.contains(&token) {
        return None;
    }
    if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
        return None;
    }
    if token.ends_with("sses")
        || token.ends_with("ches")
        || token.ends_with("shes")
        || token.ends_with("xes")
        || token.ends_with("zzes")
    {
        return Some(token[..token.len() - 2].to_string());
    }
    if token.ends_with("ies") {
        if len > 4 {
            return Some(format!("{}y", &token[..token.len() - 3]));
        }
        return Some(token[..token.len() - 1].to_string());
    }
    Some(token[..token.len() - 1].to_string())
}
