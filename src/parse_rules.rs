//! Reading of tab-separated rule files, one rule per line:
//!
//! ```text
//! NN	dog	chien	0.5
//! PHRASE	NN[0] VBD[1]	VBD[1] NN[0]	1.0
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::GrammarConfig;
use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::rules::{Pattern, RuleRecord, Symbol};

const FIELD_SEPARATOR: char = '\t';

/// Parses a single rule line. `line_no` is 1-based and only used for errors.
pub fn parse_rule(line: &str, line_no: usize) -> Result<RuleRecord, GrammarError> {
  let fields = line.split(FIELD_SEPARATOR).collect::<Vec<_>>();
  let [lhs, rhs, template, weight] = fields.as_slice() else {
    return Err(GrammarError::FieldCount {
      line: line_no,
      found: fields.len(),
    });
  };

  let rhs = Pattern::from_rhs(rhs).map_err(|found| GrammarError::NotBinarized {
    line: line_no,
    rhs: rhs.to_string(),
    found,
  })?;

  Ok(RuleRecord::new(
    Symbol::new(*lhs),
    rhs,
    *template,
    parse_weight(weight, line_no)?,
  ))
}

fn parse_weight(s: &str, line_no: usize) -> Result<f64, GrammarError> {
  let value = s.trim().parse::<f64>().map_err(|_| GrammarError::BadWeight {
    line: line_no,
    value: s.to_string(),
  })?;

  if value.is_finite() && value >= 0.0 {
    Ok(value)
  } else {
    Err(GrammarError::WeightOutOfRange {
      line: line_no,
      value,
    })
  }
}

/// Parses a whole rule file. The first malformed line aborts loading.
pub fn parse_rules(src: &str) -> Result<Vec<RuleRecord>, GrammarError> {
  src
    .lines()
    .enumerate()
    .map(|(idx, line)| parse_rule(line, idx + 1))
    .collect()
}

pub fn read_rules(path: impl AsRef<Path>) -> Result<Vec<RuleRecord>, GrammarError> {
  let path = path.as_ref();
  let src = fs::read_to_string(path).map_err(|source| GrammarError::Io {
    path: path.display().to_string(),
    source,
  })?;
  parse_rules(&src)
}

impl FromStr for Grammar {
  type Err = GrammarError;

  /// Parses a grammar from rule-file text with the default configuration.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self::new(parse_rules(s)?, GrammarConfig::default()))
  }
}

impl Grammar {
  pub fn read_from_file(
    path: impl AsRef<Path>,
    config: GrammarConfig,
  ) -> Result<Self, GrammarError> {
    Ok(Self::new(read_rules(path)?, config))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_terminal_rule() {
    let rule = parse_rule("NN\tdog\tchien\t0.5", 1).unwrap();
    assert_eq!(rule.lhs, Symbol::new("NN"));
    assert_eq!(rule.rhs, Pattern::terminal("dog"));
    assert_eq!(rule.template, "chien");
    assert_eq!(rule.weight, 0.5);
  }

  #[test]
  fn test_parse_binary_rule_with_empty_template() {
    let rule = parse_rule("PHRASE\tNN[0] VBD[1]\t\t1", 1).unwrap();
    assert_eq!(
      rule.rhs,
      Pattern::Binary("NN[0]".to_string(), "VBD[1]".to_string())
    );
    assert_eq!(rule.template, "");
  }

  #[test]
  fn test_field_count() {
    let err = parse_rule("NN\tdog\t0.5", 3).unwrap_err();
    assert!(matches!(err, GrammarError::FieldCount { line: 3, found: 3 }));

    let err = parse_rule("NN\tdog\tchien\t0.5\textra", 1).unwrap_err();
    assert!(matches!(err, GrammarError::FieldCount { found: 5, .. }));
  }

  #[test]
  fn test_bad_weights() {
    assert!(matches!(
      parse_rule("NN\tdog\tchien\tlots", 1),
      Err(GrammarError::BadWeight { .. })
    ));
    assert!(matches!(
      parse_rule("NN\tdog\tchien\t-1", 1),
      Err(GrammarError::WeightOutOfRange { .. })
    ));
    assert!(matches!(
      parse_rule("NN\tdog\tchien\tNaN", 1),
      Err(GrammarError::WeightOutOfRange { .. })
    ));
  }

  #[test]
  fn test_not_binarized() {
    let err = parse_rule("S\tA[0] B[1] C[2]\tA[0]\t1", 7).unwrap_err();
    assert_eq!(err.line(), Some(7));
    assert!(matches!(err, GrammarError::NotBinarized { found: 3, .. }));
  }

  #[test]
  fn test_parse_rules_reports_line() {
    let src = "NN\tdog\tchien\t0.5\nbroken line\n";
    let err = parse_rules(src).unwrap_err();
    assert_eq!(err.line(), Some(2));
  }

  #[test]
  fn test_empty_file() {
    assert!(parse_rules("").unwrap().is_empty());
    let g: Grammar = "".parse().unwrap();
    assert_eq!(g.scores().len(), 1);
  }

  #[test]
  fn test_missing_file() {
    let err = read_rules("/nonexistent/rules.binary").unwrap_err();
    assert!(matches!(err, GrammarError::Io { .. }));
    assert_eq!(err.line(), None);
  }
}
