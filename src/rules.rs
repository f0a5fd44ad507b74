use std::fmt;

/// Label of the start symbol and of the glue rule.
pub const PHRASE: &str = "PHRASE";

/// Weight of the synthetic glue rule.
pub const GLUE_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
  pub name: String,
}

impl Symbol {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }

  pub fn phrase() -> Self {
    Self::new(PHRASE)
  }

  pub fn is_phrase(&self) -> bool {
    self.name == PHRASE
  }

  /// The symbol as it appears in the right-hand side of a binary rule,
  /// e.g. `NN[0]` for the left child.
  pub fn tagged(&self, order: Order) -> String {
    format!("{}{}", self.name, order)
  }

  /// Whether `tok` is this symbol with either order tag.
  pub fn is_tagged(&self, tok: &str) -> bool {
    matches!(split_order_tag(tok), (name, Some(_)) if name == self.name)
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}

/// Which child of a binary rule a symbol fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
  Left,
  Right,
}

impl Order {
  pub fn index(self) -> usize {
    match self {
      Self::Left => 0,
      Self::Right => 1,
    }
  }
}

impl fmt::Display for Order {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}]", self.index())
  }
}

/// Splits a trailing `[0]` / `[1]` order tag off a symbol string.
///
/// ```
/// use scfgtrans::rules::{split_order_tag, Order};
///
/// assert_eq!(split_order_tag("NN[0]"), ("NN", Some(Order::Left)));
/// assert_eq!(split_order_tag("VBD[1]"), ("VBD", Some(Order::Right)));
/// assert_eq!(split_order_tag("PHRASE"), ("PHRASE", None));
/// ```
pub fn split_order_tag(s: &str) -> (&str, Option<Order>) {
  regex_static!(ORDER_TAG, r"^(.*)\[([01])\]$");
  match ORDER_TAG.captures(s) {
    Some(caps) => {
      let order = if &caps[2] == "0" { Order::Left } else { Order::Right };
      let name = caps.get(1).map_or("", |m| m.as_str());
      (name, Some(order))
    }
    None => (s, None),
  }
}

/// Right-hand side of a rule: a source word, or two child symbols kept exactly
/// as written in the rule file (normally tagged, `NN[0] VBD[1]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
  Terminal(String),
  Binary(String, String),
}

impl Pattern {
  /// Reads a right-hand side. Returns the symbol count on failure.
  pub fn from_rhs(rhs: &str) -> Result<Self, usize> {
    let parts = rhs.split(' ').collect::<Vec<_>>();
    match parts.as_slice() {
      [word] => Ok(Self::Terminal(word.to_string())),
      [left, right] => Ok(Self::Binary(left.to_string(), right.to_string())),
      _ => Err(parts.len()),
    }
  }

  pub fn terminal(word: &str) -> Self {
    Self::Terminal(word.to_string())
  }

  /// Key for combining a left constituent `y` with a right constituent `z`.
  pub fn binary(y: &Symbol, z: &Symbol) -> Self {
    Self::Binary(y.tagged(Order::Left), z.tagged(Order::Right))
  }
}

impl fmt::Display for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal(w) => write!(f, "{}", w),
      Self::Binary(l, r) => write!(f, "{} {}", l, r),
    }
  }
}

/// One weighted synchronous rule, `lhs -> rhs` translated by `template`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRecord {
  pub lhs: Symbol,
  pub rhs: Pattern,
  pub template: String,
  pub weight: f64,
}

impl RuleRecord {
  pub fn new(lhs: Symbol, rhs: Pattern, template: impl Into<String>, weight: f64) -> Self {
    Self {
      lhs,
      rhs,
      template: template.into(),
      weight,
    }
  }

  /// `PHRASE -> PHRASE[0] PHRASE[1]`, rendered monotonically. Lets any two
  /// adjacent phrases combine regardless of grammar coverage.
  pub fn glue() -> Self {
    let phrase = Symbol::phrase();
    let rhs = Pattern::binary(&phrase, &phrase);
    let template = rhs.to_string();
    Self::new(phrase, rhs, template, GLUE_WEIGHT)
  }
}

impl fmt::Display for RuleRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} -> {} => {:?} ({})",
      self.lhs, self.rhs, self.template, self.weight
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pattern_from_rhs() {
    assert_eq!(Pattern::from_rhs("dog"), Ok(Pattern::terminal("dog")));
    assert_eq!(Pattern::from_rhs(""), Ok(Pattern::terminal("")));
    assert_eq!(
      Pattern::from_rhs("NN[0] VBD[1]"),
      Ok(Pattern::Binary("NN[0]".to_string(), "VBD[1]".to_string()))
    );
    assert_eq!(Pattern::from_rhs("A[0] B[1] C[2]"), Err(3));
  }

  #[test]
  fn test_binary_key_matches_file_syntax() {
    let key = Pattern::binary(&Symbol::new("NN"), &Symbol::new("VBD"));
    assert_eq!(key, Pattern::from_rhs("NN[0] VBD[1]").unwrap());
    assert_eq!(key.to_string(), "NN[0] VBD[1]");
  }

  #[test]
  fn test_glue() {
    let glue = RuleRecord::glue();
    assert!(glue.lhs.is_phrase());
    assert_eq!(glue.rhs.to_string(), "PHRASE[0] PHRASE[1]");
    assert_eq!(glue.template, "PHRASE[0] PHRASE[1]");
    assert_eq!(glue.weight, 1.0);
  }

  #[test]
  fn test_split_order_tag_only_strips_suffix() {
    assert_eq!(split_order_tag("A[1]B"), ("A[1]B", None));
    assert_eq!(split_order_tag("X[2]"), ("X[2]", None));
    assert_eq!(split_order_tag("[0]"), ("", Some(Order::Left)));
  }

  #[test]
  fn test_is_tagged() {
    let nn = Symbol::new("NN");
    assert!(nn.is_tagged("NN[0]"));
    assert!(nn.is_tagged("NN[1]"));
    assert!(!nn.is_tagged("NN"));
    assert!(!nn.is_tagged("NNS[0]"));
  }
}
