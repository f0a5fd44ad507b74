use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: regex::Regex = regex::Regex::new($pattern).unwrap();
    }
  };
}

/// Splits a sentence the way the rule files expect: on single spaces, so
/// doubled or trailing spaces produce empty tokens.
///
/// ```
/// assert_eq!(scfgtrans::utils::tokenize("le  chien"), vec!["le", "", "chien"]);
/// assert_eq!(scfgtrans::utils::tokenize(""), vec![""]);
/// ```
pub fn tokenize(sentence: &str) -> Vec<&str> {
  sentence.split(' ').collect()
}
