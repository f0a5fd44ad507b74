/// Default weight of an identity rule, when enabled.
pub const IDENTITY_WEIGHT: f64 = 1e-6;

/// Options controlling how rule records are indexed and applied.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarConfig {
  /// Give every terminal right-hand side an extra `PHRASE` reading that
  /// copies the source word through. Off by default, which reproduces
  /// grammars built by the reference decoder exactly.
  pub identity_rules: bool,
  pub identity_weight: f64,
  /// Apply rules whose right-hand side is a single label (`PHRASE -> NN`)
  /// on top of a constituent already in a chart cell. A one-token right-hand
  /// side counts as a label only when its template tags it (`NN[0]`).
  /// Promotions replace weaker entries but only ever build on terminal or
  /// binary entries, so they never chain.
  pub unary_rules: bool,
}

impl Default for GrammarConfig {
  fn default() -> Self {
    Self {
      identity_rules: false,
      identity_weight: IDENTITY_WEIGHT,
      unary_rules: true,
    }
  }
}

impl GrammarConfig {
  pub fn with_identity_rules(mut self, enabled: bool) -> Self {
    self.identity_rules = enabled;
    self
  }

  pub fn with_unary_rules(mut self, enabled: bool) -> Self {
    self.unary_rules = enabled;
    self
  }
}
