// Per-step decoding rules applied to raw logits before a token is picked.
// Lengths count the whole decoder sequence, start token included.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Eos,
    MaxLength,
}

/// Forbids EOS while the sequence is shorter than `min_length`.
pub fn suppress_eos(logits: &mut [f32], eos: usize, current_len: usize, min_length: usize) {
    if current_len < min_length {
        if let Some(logit) = logits.get_mut(eos) {
            *logit = f32::NEG_INFINITY;
        }
    }
}

/// Tokens that would complete an n-gram already present in `history`.
pub fn banned_ngram_tokens(history: &[u32], n: usize) -> Vec<u32> {
    if n == 0 || history.len() + 1 < n {
        return Vec::new();
    }
    let prefix = &history[history.len() + 1 - n..];
    let mut banned: Vec<u32> = history
        .windows(n)
        .filter(|w| &w[..n - 1] == prefix)
        .map(|w| w[n - 1])
        .collect();
    banned.sort_unstable();
    banned.dedup();
    banned
}

pub fn mask_tokens(logits: &mut [f32], tokens: &[u32]) {
    for &t in tokens {
        if let Some(logit) = logits.get_mut(t as usize) {
            *logit = f32::NEG_INFINITY;
        }
    }
}

/// Checked before each decoding step.
pub fn length_exhausted(current_len: usize, max_length: usize) -> Option<StopReason> {
    (current_len >= max_length).then_some(StopReason::MaxLength)
}

/// Checked after a token is appended.
pub fn hit_eos(token: u32, eos: usize) -> Option<StopReason> {
    (token as usize == eos).then_some(StopReason::Eos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eos_blocked_until_min_length() {
        let mut logits = vec![0.5, 3.0, 1.0];
        suppress_eos(&mut logits, 1, 4, 5);
        assert_eq!(logits[1], f32::NEG_INFINITY);
        assert_eq!(logits[0], 0.5);

        let mut logits = vec![0.5, 3.0, 1.0];
        suppress_eos(&mut logits, 1, 5, 5);
        assert_eq!(logits[1], 3.0);
    }

    #[test]
    fn eos_out_of_vocab_is_ignored() {
        let mut logits = vec![1.0; 4];
        suppress_eos(&mut logits, 10, 0, 300);
        assert!(logits.iter().all(|l| *l == 1.0));
    }

    #[test]
    fn bigram_repeats_are_banned() {
        // history ... 7 8 ... 7  -> 8 would repeat "7 8"
        let history = [0, 7, 8, 3, 7];
        assert_eq!(banned_ngram_tokens(&history, 2), vec![8]);
    }

    #[test]
    fn trigram_bans_collect_every_continuation() {
        let history = [0, 1, 2, 5, 1, 2, 6, 1, 2];
        assert_eq!(banned_ngram_tokens(&history, 3), vec![5, 6]);
    }

    #[test]
    fn ngram_size_zero_or_short_history_bans_nothing() {
        assert!(banned_ngram_tokens(&[1, 1, 1], 0).is_empty());
        assert!(banned_ngram_tokens(&[1], 3).is_empty());
    }

    #[test]
    fn unigram_bans_all_seen_tokens() {
        assert_eq!(banned_ngram_tokens(&[4, 2, 4], 1), vec![2, 4]);
    }

    #[test]
    fn mask_skips_ids_outside_vocab() {
        let mut logits = vec![0.0; 3];
        mask_tokens(&mut logits, &[2, 99]);
        assert_eq!(logits, vec![0.0, 0.0, f32::NEG_INFINITY]);
    }

    #[test]
    fn stop_conditions() {
        assert_eq!(length_exhausted(999, 1000), None);
        assert_eq!(length_exhausted(1000, 1000), Some(StopReason::MaxLength));
        assert_eq!(hit_eos(1, 1), Some(StopReason::Eos));
        assert_eq!(hit_eos(2, 1), None);
    }
}
