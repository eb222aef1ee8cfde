//! Name inflection helpers for model and association names.
//!
//! Root elements, collection paths and association target names are all
//! derived from type names:
//!
//! - `Foo::BlogPost` demodulizes to `BlogPost` and underscores to `blog_post`
//! - `blog_post` pluralizes to `blog_posts`
//! - `blog_posts` classifies to `BlogPost`
//!
//! Inflection uses the usual English suffix rules plus a short list of
//! irregular and uncountable words. Only the last `_`-separated segment of a
//! word is inflected, so `blog_person` pluralizes to `blog_people`.
//!
//! # Example
//!
//! ```rust
//! use rest_model::rest::naming::{classify, pluralize, root_element_for, singularize};
//!
//! assert_eq!(root_element_for("Foo::BlogPost"), "blog_post");
//! assert_eq!(pluralize("person"), "people");
//! assert_eq!(singularize("categories"), "category");
//! assert_eq!(classify("blog_posts"), "BlogPost");
//! ```

use heck::{ToSnakeCase, ToUpperCamelCase};

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
];

/// `(singular, plural)` pairs that bypass the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("zombie", "zombies"),
    ("ox", "oxen"),
    ("mouse", "mice"),
    ("louse", "lice"),
];

/// Strips any namespace prefix from a type name.
///
/// `"Foo::Bar::User"` becomes `"User"`.
#[must_use]
pub fn demodulize(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Converts a `CamelCase` name into `snake_case`.
///
/// Acronym runs are kept together (`HTMLPage` becomes `html_page`) and
/// dashes become underscores.
#[must_use]
pub fn underscore(word: &str) -> String {
    word.to_snake_case()
}

/// Returns the default root element for a (possibly namespaced) type name.
#[must_use]
pub fn root_element_for(type_name: &str) -> String {
    underscore(demodulize(type_name))
}

/// Converts `snake_case` into `CamelCase`.
#[must_use]
pub fn camelize(word: &str) -> String {
    word.to_upper_camel_case()
}

/// Turns a plural association name into a type name (`blog_posts` to `BlogPost`).
#[must_use]
pub fn classify(word: &str) -> String {
    camelize(&singularize(word))
}

/// Returns the plural form of `word`.
#[must_use]
pub fn pluralize(word: &str) -> String {
    inflect_last_segment(word, pluralize_segment)
}

/// Returns the singular form of `word`.
#[must_use]
pub fn singularize(word: &str) -> String {
    inflect_last_segment(word, singularize_segment)
}

fn inflect_last_segment(word: &str, inflect: fn(&str) -> String) -> String {
    match word.rfind('_') {
        Some(i) => format!("{}{}", &word[..=i], inflect(&word[i + 1..])),
        None => inflect(word),
    }
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Matches `([^aeiouy]|qu)` at the end of `stem`.
fn ends_with_consonant_or_qu(stem: &str) -> bool {
    stem.ends_with("qu") || stem.chars().last().is_some_and(|c| !is_vowel(c))
}

fn pluralize_segment(w: &str) -> String {
    if w.is_empty() || UNCOUNTABLE.contains(&w) {
        return w.to_string();
    }
    for &(singular, plural) in IRREGULAR {
        if w == singular {
            return plural.to_string();
        }
        if w == plural {
            return w.to_string();
        }
    }

    if w.ends_with("quiz") {
        return format!("{w}zes");
    }
    for (from, to) in [("matrix", "matrices"), ("vertex", "vertices"), ("index", "indices")] {
        if let Some(stem) = w.strip_suffix(from) {
            return format!("{stem}{to}");
        }
    }
    if ["x", "ch", "ss", "sh"].iter().any(|s| w.ends_with(s)) {
        return format!("{w}es");
    }
    if let Some(stem) = w.strip_suffix('y') {
        if ends_with_consonant_or_qu(stem) {
            return format!("{stem}ies");
        }
    }
    if w.ends_with("hive") {
        return format!("{w}s");
    }
    if let Some(stem) = w.strip_suffix("fe") {
        if stem.chars().last().is_some_and(|c| c != 'f') {
            return format!("{stem}ves");
        }
    }
    if let Some(stem) = w.strip_suffix('f') {
        if stem.ends_with(['l', 'r']) {
            return format!("{stem}ves");
        }
    }
    if let Some(stem) = w.strip_suffix("sis") {
        return format!("{stem}ses");
    }
    if w.ends_with("ta") || w.ends_with("ia") {
        return w.to_string();
    }
    if let Some(stem) = w.strip_suffix("um") {
        if stem.ends_with(['t', 'i']) {
            return format!("{stem}a");
        }
    }
    if w.ends_with("buffalo") || w.ends_with("tomato") {
        return format!("{w}es");
    }
    if w.ends_with("bus") {
        return format!("{w}es");
    }
    if w.ends_with("alias") || w.ends_with("status") {
        return format!("{w}es");
    }
    if w.ends_with("octopi") || w.ends_with("viri") {
        return w.to_string();
    }
    if let Some(stem) = w.strip_suffix("us") {
        if stem.ends_with("octop") || stem.ends_with("vir") {
            return format!("{stem}i");
        }
    }
    if w == "axis" || w == "testis" {
        return format!("{}es", &w[..w.len() - 2]);
    }
    if w.ends_with('s') {
        return w.to_string();
    }

    format!("{w}s")
}

fn singularize_segment(w: &str) -> String {
    if w.is_empty() || UNCOUNTABLE.contains(&w) {
        return w.to_string();
    }
    for &(singular, plural) in IRREGULAR {
        if w == plural {
            return singular.to_string();
        }
        if w == singular {
            return w.to_string();
        }
    }

    if let Some(stem) = w.strip_suffix("databases") {
        return format!("{stem}database");
    }
    if let Some(stem) = w.strip_suffix("quizzes") {
        return format!("{stem}quiz");
    }
    if let Some(stem) = w.strip_suffix("matrices") {
        return format!("{stem}matrix");
    }
    for (from, to) in [("vertices", "vertex"), ("indices", "index")] {
        if let Some(stem) = w.strip_suffix(from) {
            return format!("{stem}{to}");
        }
    }
    for word in ["alias", "status"] {
        if let Some(stem) = w.strip_suffix(&format!("{word}es")) {
            return format!("{stem}{word}");
        }
        if w.ends_with(word) {
            return w.to_string();
        }
    }
    for stem in ["octop", "vir"] {
        if w.ends_with(&format!("{stem}i")) || w.ends_with(&format!("{stem}us")) {
            let base = w.rfind(stem).map_or(w, |i| &w[..i]);
            return format!("{base}{stem}us");
        }
    }
    if w == "axes" || w == "axis" {
        return "axis".to_string();
    }
    for stem in ["cris", "test"] {
        if let Some(base) = w
            .strip_suffix(&format!("{stem}es"))
            .or_else(|| w.strip_suffix(&format!("{stem}is")))
        {
            return format!("{base}{stem}is");
        }
    }
    if let Some(stem) = w.strip_suffix("shoes") {
        return format!("{stem}shoe");
    }
    if let Some(stem) = w.strip_suffix("oes") {
        return format!("{stem}o");
    }
    if let Some(stem) = w.strip_suffix("buses") {
        return format!("{stem}bus");
    }
    if w.ends_with("bus") {
        return w.to_string();
    }
    for suffix in ["xes", "ches", "sses", "shes"] {
        if let Some(stem) = w.strip_suffix(suffix) {
            return format!("{stem}{}", &suffix[..suffix.len() - 2]);
        }
    }
    if let Some(stem) = w.strip_suffix("movies") {
        return format!("{stem}movie");
    }
    if let Some(stem) = w.strip_suffix("ies") {
        if ends_with_consonant_or_qu(stem) {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = w.strip_suffix("ves") {
        if stem.ends_with(['l', 'r']) {
            return format!("{stem}f");
        }
    }
    if w.ends_with("tives") || w.ends_with("hives") {
        return w[..w.len() - 1].to_string();
    }
    if let Some(stem) = w.strip_suffix("ves") {
        if stem.chars().last().is_some_and(|c| c != 'f') {
            return format!("{stem}fe");
        }
    }
    for stem in ["analy", "ba", "diagno", "parenthe", "progno", "synop", "the"] {
        if let Some(base) = w.strip_suffix(&format!("{stem}ses")) {
            return format!("{base}{stem}sis");
        }
        if w.ends_with(&format!("{stem}sis")) {
            return w.to_string();
        }
    }
    if let Some(stem) = w.strip_suffix('a') {
        if stem.ends_with(['t', 'i']) {
            return format!("{stem}um");
        }
    }
    if w.ends_with("ss") {
        return w.to_string();
    }
    if let Some(stem) = w.strip_suffix('s') {
        return stem.to_string();
    }

    w.to_string()
}
