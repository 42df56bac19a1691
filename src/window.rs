//! Windowed co-occurrence counting
use std::cmp::min;
use std::hash::Hash;
use crate::counts::CountTable;
use crate::corpus::Token;
use crate::vocab::Vocabulary;

/// Every directed (target, context) observation within `window_size` tokens of each other
///
/// The window is clipped at both ends of the sequence, so short sequences yield fewer pairs.
pub fn window_pairs<'t, T>(tokens: &'t [T], window_size: usize)
    -> impl Iterator<Item = (&'t T, &'t T)> + 't {
    (0..tokens.len()).flat_map(move |target_i| {
        let start = target_i.saturating_sub(window_size);
        let end = min(tokens.len(), target_i.saturating_add(window_size).saturating_add(1));
        (start..end)
            .filter(move |&context_i| context_i != target_i)
            .map(move |context_i| (&tokens[target_i], &tokens[context_i]))
    })
}

/// Count how often each (target, context) pair occurs within the window
pub fn count_cooccurrence<'t, T: Hash + Eq>(tokens: &'t [T], window_size: usize)
    -> CountTable<(&'t T, &'t T)> {
    let mut counts = CountTable::new();
    for pair in window_pairs(tokens, window_size) {
        counts.increment(pair);
    }
    counts
}

/// Keep the pairs whose target and context are both known, rewritten to their ids
///
/// Unknown words are dropped silently. When a vocabulary ignores tags, several tagged pairs can
/// land on the same ids; their counts are added up.
pub fn restrict<'t>(
    counts: CountTable<(&'t Token, &'t Token)>,
    targets: &Vocabulary,
    context: &Vocabulary,
) -> CountTable<(u32, u32)> {
    counts.into_iter()
        .filter_map(|((target, ctx), n)| {
            let target_id = targets.id_of(target)?;
            let context_id = context.id_of(ctx)?;
            Some(((target_id, context_id), n))
        })
        .collect()
}
