//! Expands the best derivation in a chart into target-language text by
//! walking backpointers and filling in each rule's template.
//!
//! Missing entries never abort: a span with no derivation, or a rule with no
//! template, contributes the empty string.

use tracing::trace;

use crate::chart::{Backpointer, Chart, Entry};
use crate::grammar::TemplateIndex;
use crate::rules::{split_order_tag, Order, Pattern, Symbol};

/// Renders `label` over the span `(start, end)`. `label` may carry an order
/// tag (`NN[0]`), which is ignored.
pub fn render(
  templates: &TemplateIndex,
  chart: &Chart,
  start: usize,
  end: usize,
  label: &str,
) -> String {
  let mut out = String::new();
  render_into(templates, chart, start, end, label, &mut out);
  out
}

fn render_into(
  templates: &TemplateIndex,
  chart: &Chart,
  start: usize,
  end: usize,
  label: &str,
  out: &mut String,
) {
  let label = Symbol::new(split_order_tag(label).0);
  match chart.get(start, end, &label) {
    Some(entry) => render_entry(templates, chart, entry, out),
    None => trace!(start, end, %label, "no derivation"),
  }
}

fn render_entry(templates: &TemplateIndex, chart: &Chart, entry: &Entry, out: &mut String) {
  let label = entry.back.label();
  let (start, end) = entry.back.span();

  match &entry.back {
    Backpointer::Terminal { token, .. } => {
      let rhs = Pattern::terminal(token);
      if let Some(rule) = templates.get(label, &rhs) {
        // an empty template deletes the word
        if !rule.template.is_empty() {
          out.push_str(&rule.template);
          out.push(' ');
        }
      } else if let Some(rule) = templates.get(&Symbol::phrase(), &rhs) {
        out.push_str(&rule.template);
      } else {
        trace!(start, end, %label, token = token.as_str(), "no template");
      }
    }

    Backpointer::Unary { child, .. } => {
      let Some(rule) = templates.unary(label, child) else {
        trace!(start, end, %label, %child, "no template");
        return;
      };
      // the child is the entry the rule was applied to, not a later promotion
      let base = chart.get_base(start, end, child);
      for tok in rule.template.split(' ') {
        if child.is_tagged(tok) {
          if let Some(base) = base {
            render_entry(templates, chart, base, out);
          }
        } else {
          push_literal(tok, out);
        }
      }
    }

    Backpointer::Binary {
      left, right, split, ..
    } => {
      let y = left.tagged(Order::Left);
      let z = right.tagged(Order::Right);
      let Some(rule) = templates.get(label, &Pattern::binary(left, right)) else {
        trace!(start, end, %label, %y, %z, "no template");
        return;
      };
      // children can appear in any order, which is how rules reorder
      for tok in rule.template.split(' ') {
        if tok == y {
          render_into(templates, chart, start, *split, &y, out);
        } else if tok == z {
          render_into(templates, chart, *split, end, &z, out);
        } else {
          push_literal(tok, out);
        }
      }
    }
  }
}

fn push_literal(tok: &str, out: &mut String) {
  out.push_str(tok);
  out.push(' ');
}

#[cfg(test)]
mod tests {
  use crate::config::GrammarConfig;
  use crate::grammar::Grammar;
  use crate::rules::{Pattern, RuleRecord, Symbol};

  fn rule(lhs: &str, rhs: &str, template: &str, weight: f64) -> RuleRecord {
    RuleRecord::new(Symbol::new(lhs), Pattern::from_rhs(rhs).unwrap(), template, weight)
  }

  fn grammar(rules: Vec<RuleRecord>) -> Grammar {
    Grammar::new(rules, GrammarConfig::default())
  }

  #[test]
  fn test_max_weight_template_wins() {
    let g = grammar(vec![
      rule("NN", "dog", "dog", 0.9),
      rule("NN", "dog", "chien", 0.5),
      rule("PHRASE", "NN", "NN[0]", 1.0),
    ]);
    assert_eq!(g.translate("dog"), "dog ");
  }

  #[test]
  fn test_reordering() {
    let g = grammar(vec![
      rule("NN", "dog", "dog", 1.0),
      rule("VBD", "ran", "ran", 1.0),
      rule("PHRASE", "NN[0] VBD[1]", "VBD[1] NN[0]", 1.0),
    ]);
    assert_eq!(g.translate("dog ran"), "ran dog ");
  }

  #[test]
  fn test_literal_words_in_template() {
    let g = grammar(vec![
      rule("NN", "chat", "cat", 1.0),
      rule("JJ", "noir", "black", 1.0),
      rule("PHRASE", "NN[0] JJ[1]", "the JJ[1] NN[0]", 1.0),
    ]);
    assert_eq!(g.translate("chat noir"), "the black cat ");
  }

  #[test]
  fn test_deletion_rule() {
    let g = grammar(vec![
      rule("PHRASE", "ne", "", 1.0),
      rule("PHRASE", "dort", "sleeps", 1.0),
    ]);
    assert_eq!(g.translate("ne dort"), "sleeps ");
    assert_eq!(g.translate("ne"), "");
  }

  #[test]
  fn test_glue_concatenates() {
    let g = grammar(vec![
      rule("PHRASE", "le", "the", 1.0),
      rule("PHRASE", "chat", "cat", 1.0),
      rule("PHRASE", "dort", "sleeps", 1.0),
    ]);
    assert_eq!(g.translate("le chat dort"), "the cat sleeps ");
  }

  #[test]
  fn test_no_derivation_is_empty() {
    let g = grammar(vec![rule("NN", "dog", "chien", 1.0)]);
    assert_eq!(g.translate("dog"), "");
    assert_eq!(g.translate("cat"), "");
    assert_eq!(g.translate(""), "");
  }

  #[test]
  fn test_missing_child_renders_partial() {
    let g = grammar(vec![
      rule("NN", "dog", "dog", 1.0),
      rule("PHRASE", "NN[0] NN[1]", "NN[0] and NN[1]", 1.0),
    ]);
    let chart = g.parse_chart(&["dog", "dog"]);
    // a label the chart does not hold renders as nothing
    assert_eq!(super::render(g.templates(), &chart, 0, 1, "VB[0]"), "");
    assert_eq!(super::render(g.templates(), &chart, 0, 2, "PHRASE"), "dog and dog ");
  }

  #[test]
  fn test_tagged_label_is_stripped() {
    let g = grammar(vec![rule("NN", "dog", "chien", 1.0)]);
    let chart = g.parse_chart(&["dog"]);
    assert_eq!(super::render(g.templates(), &chart, 0, 1, "NN[1]"), "chien ");
    assert_eq!(super::render(g.templates(), &chart, 0, 1, "NN"), "chien ");
  }

  #[test]
  fn test_phrase_fallback_for_unknown_terminal_template() {
    let parsed = grammar(vec![rule("NN", "dog", "dog", 1.0)]);
    let rendering = grammar(vec![rule("PHRASE", "dog", "chien", 1.0)]);
    let chart = parsed.parse_chart(&["dog"]);
    assert_eq!(super::render(rendering.templates(), &chart, 0, 1, "NN"), "chien");

    let empty = grammar(Vec::new());
    assert_eq!(super::render(empty.templates(), &chart, 0, 1, "NN"), "");
  }

  #[test]
  fn test_identity_rules_pass_words_through() {
    let rules = vec![rule("NN", "chat", "cat", 1.0), rule("VB", "dort", "sleeps", 1.0)];

    let g = grammar(rules.clone());
    assert_eq!(g.translate("chat dort"), "");

    let g = Grammar::new(rules, GrammarConfig::default().with_identity_rules(true));
    // only the bare PHRASE readings glue together, and they copy the source
    assert_eq!(g.translate("chat dort"), "chat dort ");
  }

  #[test]
  fn test_unary_reading_outscores_direct_phrase() {
    let g = grammar(vec![
      rule("NN", "dog", "chien", 1.0),
      rule("PHRASE", "dog", "DOGGY", 0.01),
      rule("PHRASE", "NN", "NN[0]", 1.0),
    ]);
    assert_eq!(g.translate("dog"), "chien ");
  }

  #[test]
  fn test_unary_over_replaced_label() {
    // A and B promote each other; each renders the other's terminal entry
    let g = grammar(vec![
      rule("A", "x", "a", 0.1),
      rule("B", "x", "b", 0.1),
      rule("A", "B", "B[0] !", 10.0),
      rule("B", "A", "A[0] ?", 10.0),
    ]);
    let chart = g.parse_chart(&["x"]);
    assert_eq!(super::render(g.templates(), &chart, 0, 1, "A"), "b ! ");
    assert_eq!(super::render(g.templates(), &chart, 0, 1, "B"), "a ? ");
  }

  #[test]
  fn test_label_named_source_word_is_not_unary() {
    let g = grammar(vec![
      rule("NN", "dog", "chien", 1.0),
      rule("VB", "NN", "foo", 1.0),
      rule("PHRASE", "NN", "NN[0]", 1.0),
    ]);
    let chart = g.parse_chart(&["dog"]);
    assert!(chart.get(0, 1, &Symbol::new("VB")).is_none());
    assert_eq!(g.translate("dog"), "chien ");
  }
}
