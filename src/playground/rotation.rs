use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Kinds of playground content, each with a selection weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    BotSpotlight,
    BotLore,
    ArtifactShowcase,
    ArenaRecap,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::BotSpotlight,
        ContentKind::BotLore,
        ContentKind::ArtifactShowcase,
        ContentKind::ArenaRecap,
    ];

    pub fn weight(self) -> u32 {
        match self {
            ContentKind::BotSpotlight => 4,
            ContentKind::BotLore => 3,
            ContentKind::ArtifactShowcase => 2,
            ContentKind::ArenaRecap => 1,
        }
    }

    /// Stable name stored in the post history.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::BotSpotlight => "bot_spotlight",
            ContentKind::BotLore => "bot_lore",
            ContentKind::ArtifactShowcase => "artifact_showcase",
            ContentKind::ArenaRecap => "arena_recap",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        ContentKind::ALL.into_iter().find(|k| k.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::BotSpotlight => "Bot Spotlight",
            ContentKind::BotLore => "Bot Lore",
            ContentKind::ArtifactShowcase => "Artifact Showcase",
            ContentKind::ArenaRecap => "Arena Recap",
        }
    }
}

/// Weighted content picker that never serves the same kind twice in a row.
#[derive(Debug, Default, Clone)]
pub struct Rotation {
    last: Option<ContentKind>,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after a restart with the kind of the latest recorded post.
    pub fn resume(last: Option<ContentKind>) -> Self {
        Self { last }
    }

    pub fn last(&self) -> Option<ContentKind> {
        self.last
    }

    /// Pick the next kind. Does not change the rotation; call [`Rotation::record`]
    /// once the post actually went out.
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> ContentKind {
        let candidates: Vec<ContentKind> = ContentKind::ALL
            .into_iter()
            .filter(|k| Some(*k) != self.last)
            .collect();

        match WeightedIndex::new(candidates.iter().map(|k| k.weight())) {
            Ok(index) => candidates[index.sample(rng)],
            Err(_) => ContentKind::BotSpotlight,
        }
    }

    pub fn record(&mut self, kind: ContentKind) {
        self.last = Some(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_never_repeats_previous_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut rotation = Rotation::new();
        let mut previous = None;

        for _ in 0..500 {
            let kind = rotation.next(&mut rng);
            assert_ne!(Some(kind), previous);
            rotation.record(kind);
            previous = Some(kind);
        }
    }

    #[test]
    fn test_next_does_not_advance_without_record() {
        let mut rng = StdRng::seed_from_u64(1);
        let rotation = Rotation::resume(Some(ContentKind::BotLore));

        for _ in 0..100 {
            assert_ne!(rotation.next(&mut rng), ContentKind::BotLore);
        }
        assert_eq!(rotation.last(), Some(ContentKind::BotLore));
    }

    #[test]
    fn test_weights_shape_distribution() {
        let mut rng = StdRng::seed_from_u64(42);
        let rotation = Rotation::new();
        let mut counts: HashMap<ContentKind, u32> = HashMap::new();

        for _ in 0..10_000 {
            *counts.entry(rotation.next(&mut rng)).or_default() += 1;
        }

        let spotlight = counts[&ContentKind::BotSpotlight];
        let recap = counts[&ContentKind::ArenaRecap];
        // Expected 4000 and 1000
        assert!((3600..4400).contains(&spotlight), "spotlight = {}", spotlight);
        assert!((800..1200).contains(&recap), "recap = {}", recap);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ContentKind::ALL {
            assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ContentKind::parse("unknown"), None);
    }
}
