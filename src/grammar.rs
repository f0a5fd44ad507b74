use std::fmt;

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::config::GrammarConfig;
use crate::rules::{Pattern, RuleRecord, Symbol};

/// A target template together with the weight it was indexed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted {
  pub template: String,
  pub weight: f64,
}

impl Weighted {
  pub fn new(template: impl Into<String>, weight: f64) -> Self {
    Self {
      template: template.into(),
      weight,
    }
  }
}

/// Right-hand side -> left-hand side -> summed weight. Used for scoring
/// during parsing. The template kept for a slot is the first one seen for it.
#[derive(Debug, Clone, Default)]
pub struct ScoreIndex(IndexMap<Pattern, IndexMap<Symbol, Weighted>>);

impl ScoreIndex {
  fn accumulate(&mut self, rhs: &Pattern, lhs: &Symbol, template: &str, weight: f64) {
    let slot = self
      .0
      .entry(rhs.clone())
      .or_default()
      .entry(lhs.clone())
      .or_insert_with(|| Weighted::new(template, 0.0));
    slot.weight += weight;
  }

  fn seed(&mut self, rhs: &Pattern, lhs: &Symbol, template: &str, weight: f64) {
    self
      .0
      .entry(rhs.clone())
      .or_default()
      .entry(lhs.clone())
      .or_insert_with(|| Weighted::new(template, weight));
  }

  /// Every left-hand side that can build `rhs`, in first-seen order.
  pub fn candidates(&self, rhs: &Pattern) -> Option<&IndexMap<Symbol, Weighted>> {
    self.0.get(rhs)
  }

  pub fn get(&self, rhs: &Pattern, lhs: &Symbol) -> Option<&Weighted> {
    self.candidates(rhs)?.get(lhs)
  }

  /// Number of distinct right-hand sides.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &IndexMap<Symbol, Weighted>)> {
    self.0.iter()
  }
}

/// Left-hand side -> right-hand side -> highest weighted template. Used for
/// rendering the winning derivation.
#[derive(Debug, Clone, Default)]
pub struct TemplateIndex(IndexMap<Symbol, IndexMap<Pattern, Weighted>>);

impl TemplateIndex {
  /// Replaces the stored entry only on a strictly greater weight.
  fn keep_max(&mut self, lhs: &Symbol, rhs: &Pattern, template: &str, weight: f64) {
    match self.0.entry(lhs.clone()).or_default().entry(rhs.clone()) {
      Entry::Vacant(e) => {
        e.insert(Weighted::new(template, weight));
      }
      Entry::Occupied(mut e) => {
        if weight > e.get().weight {
          e.insert(Weighted::new(template, weight));
        }
      }
    }
  }

  fn set(&mut self, lhs: &Symbol, rhs: &Pattern, template: &str, weight: f64) {
    self
      .0
      .entry(lhs.clone())
      .or_default()
      .insert(rhs.clone(), Weighted::new(template, weight));
  }

  fn set_if_absent(&mut self, lhs: &Symbol, rhs: &Pattern, template: &str, weight: f64) {
    self
      .0
      .entry(lhs.clone())
      .or_default()
      .entry(rhs.clone())
      .or_insert_with(|| Weighted::new(template, weight));
  }

  pub fn get(&self, lhs: &Symbol, rhs: &Pattern) -> Option<&Weighted> {
    self.0.get(lhs)?.get(rhs)
  }

  /// Template of the single-label rule `lhs -> child`. A one-token right-hand
  /// side only names a label when its best template refers to it with an
  /// order tag (`NN[0]`); otherwise it is a plain source word.
  pub fn unary(&self, lhs: &Symbol, child: &Symbol) -> Option<&Weighted> {
    self
      .get(lhs, &Pattern::Terminal(child.name.clone()))
      .filter(|w| w.template.split(' ').any(|tok| child.is_tagged(tok)))
  }

  /// Number of distinct left-hand sides.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &IndexMap<Pattern, Weighted>)> {
    self.0.iter()
  }
}

/// Both rule indices plus the set of left-hand labels. Immutable once built.
#[derive(Debug, Clone)]
pub struct Grammar {
  scores: ScoreIndex,
  templates: TemplateIndex,
  labels: IndexSet<Symbol>,
  config: GrammarConfig,
}

impl Grammar {
  pub fn new(records: impl IntoIterator<Item = RuleRecord>, config: GrammarConfig) -> Self {
    let mut g = Self {
      scores: ScoreIndex::default(),
      templates: TemplateIndex::default(),
      labels: IndexSet::new(),
      config,
    };

    let mut count = 0;
    for record in records {
      g.add(&record);
      count += 1;
    }
    g.add_glue();

    debug!(
      rules = count,
      labels = g.labels.len(),
      patterns = g.scores.len(),
      identity_rules = g.config.identity_rules,
      "indexed grammar"
    );

    g
  }

  fn add(&mut self, r: &RuleRecord) {
    self.templates.keep_max(&r.lhs, &r.rhs, &r.template, r.weight);
    self.scores.accumulate(&r.rhs, &r.lhs, &r.template, r.weight);

    if self.config.identity_rules {
      if let Pattern::Terminal(word) = &r.rhs {
        let phrase = Symbol::phrase();
        let weight = self.config.identity_weight;
        self.scores.accumulate(&r.rhs, &phrase, word, weight);
        self.templates.set_if_absent(&phrase, &r.rhs, word, weight);
      }
    }

    self.labels.insert(r.lhs.clone());
  }

  fn add_glue(&mut self) {
    let glue = RuleRecord::glue();
    self.templates.set(&glue.lhs, &glue.rhs, &glue.template, glue.weight);
    // a grammar-supplied glue rule keeps its summed weight
    self.scores.seed(&glue.rhs, &glue.lhs, &glue.template, glue.weight);
    self.labels.insert(glue.lhs);
  }

  pub fn scores(&self) -> &ScoreIndex {
    &self.scores
  }

  pub fn templates(&self) -> &TemplateIndex {
    &self.templates
  }

  pub fn labels(&self) -> &IndexSet<Symbol> {
    &self.labels
  }

  pub fn config(&self) -> &GrammarConfig {
    &self.config
  }
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "//** labels:")?;
    for label in self.labels.iter() {
      write!(f, " {}", label)?;
    }
    writeln!(f)?;

    writeln!(f, "//** templates:")?;
    for (lhs, rules) in self.templates.iter() {
      for (rhs, w) in rules.iter() {
        writeln!(f, "{} -> {} => {:?} ({})", lhs, rhs, w.template, w.weight)?;
      }
    }

    writeln!(f, "//** scores:")?;
    for (rhs, lhss) in self.scores.iter() {
      for (lhs, w) in lhss.iter() {
        writeln!(f, "{} <- {} ({})", rhs, lhs, w.weight)?;
      }
    }

    Ok(())
  }
}
