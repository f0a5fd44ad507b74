#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod utils;

pub mod chart;
pub mod config;
pub mod error;
pub mod grammar;
pub mod parse_rules;
pub mod render;
pub mod rules;
pub mod syntree;

use tracing::debug;

use crate::chart::Chart;
use crate::rules::PHRASE;
use crate::syntree::SynTree;

pub use crate::config::GrammarConfig;
pub use crate::error::GrammarError;
pub use crate::grammar::Grammar;
pub use crate::rules::{Pattern, RuleRecord, Symbol};
pub use crate::utils::Err;

impl Grammar {
  pub fn parse_chart(&self, input: &[&str]) -> Chart {
    Chart::parse(self, input)
  }

  /// Best derivation of the whole input, if there is one.
  pub fn derivation(&self, input: &[&str]) -> Option<SynTree<Symbol, String>> {
    self.parse_chart(input).derivation(&Symbol::phrase(), 0, input.len())
  }

  /// Translates pre-split input. Empty when no `PHRASE` covers it.
  pub fn translate_tokens(&self, input: &[&str]) -> String {
    let chart = self.parse_chart(input);
    let out = render::render(self.templates(), &chart, 0, input.len(), PHRASE);
    debug!(tokens = input.len(), chars = out.len(), "translated");
    out
  }

  /// Splits `sentence` on single spaces and translates it.
  pub fn translate(&self, sentence: &str) -> String {
    self.translate_tokens(&utils::tokenize(sentence))
  }
}

#[test]
fn test_translate_from_rule_file() {
  let g: Grammar = "NN\tdog\tdog\t0.9
NN\tdog\tchien\t0.5
VBD\tran\tcourait\t1.0
PHRASE\tNN\tNN[0]\t1.0
PHRASE\tNN[0] VBD[1]\tle NN[0] VBD[1]\t1.0"
    .parse()
    .unwrap();

  assert_eq!(g.translate("dog"), "dog ");
  assert_eq!(g.translate("dog ran"), "le dog courait ");
  assert_eq!(g.translate("ran"), "");

  let tree = g.derivation(&["dog", "ran"]).unwrap();
  assert_eq!(tree.leaves().len(), 2);
}

#[test]
fn test_deterministic_output() {
  let g: Grammar = "A\tx\ta\t0.5
B\tx\tb\t0.5
PHRASE\tA[0] B[1]\tA[0] B[1]\t1.0
PHRASE\tB[0] A[1]\tB[0] A[1]\t1.0"
    .parse()
    .unwrap();

  // both orders score the same, the first one found is kept every time
  let first = g.translate("x x");
  assert_eq!(first, "a b ");
  for _ in 0..10 {
    assert_eq!(g.translate("x x"), first);
  }
}

#[test]
fn test_grammar_is_shared_across_threads() {
  let g: Grammar = "PHRASE\tle\tthe\t1\nPHRASE\tchat\tcat\t1".parse().unwrap();
  let outputs = std::thread::scope(|s| {
    let g = &g;
    let handles = ["le chat", "chat le", "le le chat"]
      .into_iter()
      .map(|sentence| s.spawn(move || g.translate(sentence)))
      .collect::<Vec<_>>();
    handles
      .into_iter()
      .map(|h| h.join().unwrap())
      .collect::<Vec<_>>()
  });
  assert_eq!(outputs, vec!["the cat ", "cat the ", "the the cat "]);
}

#[test]
fn test_bench_grammar() {
  let g: Grammar = include_str!("../benches/toy.rules").parse().unwrap();

  assert_eq!(g.translate("le chat noir dort"), "the black cat sleeps ");
  assert_eq!(g.translate("le chien"), "the dog ");
  // "et" has no rule, so nothing covers the sentence
  assert_eq!(g.translate("le chat et le chien"), "");
}
