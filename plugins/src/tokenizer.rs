use chatops_core::api::Tokenizer;

/// Rough token estimate: about four characters per token, never fewer
/// tokens than words. Good enough for the advisory plan totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

impl Tokenizer for HeuristicTokenizer {
    fn count_tokens(&self, text: &str, _model: &str) -> usize {
        let chars = text.chars().count();
        let words = text.split_whitespace().count();
        chars.div_ceil(4).max(words)
    }
}
